//! Expression compiler front door.
//!
//! `TokenExpressionParser` owns the full pipeline for a single
//! fragment: context inference, source transformers, lexing, grammar,
//! and node dispatch. Parses are cached by original source text in a
//! bounded LRU, so repeated fragments (common in list rendering) pay
//! for compilation once.

use crate::context::{infer_context, ParseContext};
use crate::error::ParseError;
use crate::grammar::parse_fragment;
use crate::nodes::{NodeRegistry, ParseSession};
use crate::stream::TokenStream;
use crate::transform::{BlockStatementTransformer, FormatSpecifierTransformer, SourceTransformer};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokenfmt_ast::TokenExpression;

const CACHE_CAPACITY: usize = 1000;

/// Bounded parse cache keyed by original fragment source.
struct ParseCache {
    entries: HashMap<String, Arc<TokenExpression>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ParseCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&mut self, source: &str) -> Option<Arc<TokenExpression>> {
        let expression = self.entries.get(source)?.clone();
        if let Some(index) = self.order.iter().position(|key| key == source) {
            self.order.remove(index);
        }
        self.order.push_back(source.to_string());
        Some(expression)
    }

    fn insert(&mut self, source: String, expression: Arc<TokenExpression>) {
        if self.entries.insert(source.clone(), expression).is_none() {
            self.order.push_back(source);
            while self.entries.len() > self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.entries.remove(&evicted);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Compiles expression fragments into token expressions.
///
/// An instance is cheap to share behind an `Arc`; all state is the
/// parse cache, which is interior-mutable.
pub struct TokenExpressionParser {
    transformers: Vec<Box<dyn SourceTransformer>>,
    registry: NodeRegistry,
    cache: Mutex<ParseCache>,
}

impl Default for TokenExpressionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenExpressionParser {
    /// Creates a parser with the standard transformer pipeline and node
    /// registry.
    pub fn new() -> Self {
        Self {
            transformers: vec![
                Box::new(FormatSpecifierTransformer),
                Box::new(BlockStatementTransformer),
            ],
            registry: NodeRegistry::standard(),
            cache: Mutex::new(ParseCache::new(CACHE_CAPACITY)),
        }
    }

    /// Compiles one expression fragment.
    ///
    /// The fragment is the text between a format string's braces
    /// (without the braces), or a `$:`-prefixed function expression.
    /// Results are shared through the cache, keyed by the raw source.
    pub fn parse(&self, source: &str) -> Result<Arc<TokenExpression>, ParseError> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(expression) = cache.get(source) {
                tracing::trace!(source, "expression cache hit");
                return Ok(expression);
            }
        }

        let expression = Arc::new(self.compile(source)?);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(source.to_string(), expression.clone());
            tracing::debug!(source, cached = cache.len(), "compiled expression");
        }
        Ok(expression)
    }

    /// Runs the uncached pipeline.
    fn compile(&self, source: &str) -> Result<TokenExpression, ParseError> {
        let context = infer_context(source);

        let stripped = match context {
            ParseContext::FunctionExpression => strip_function_prefix(source),
            _ => source,
        };

        let mut transformed = stripped.to_string();
        for transformer in &self.transformers {
            if transformer.name() == "format-specifier" && !context.allows_format_specifier() {
                continue;
            }
            transformed = transformer.transform(&transformed);
        }
        // Both rewrites prepend exactly "{ "; offsets reported on
        // tokens refer to the fragment as the caller wrote it.
        let offset_adjust = if transformed.len() > stripped.len() {
            2
        } else {
            0
        };

        let tokens = tokenfmt_lexer::tokenize(&transformed)
            .map_err(|offset| ParseError::invalid_syntax("unrecognized character", offset))?;
        let mut stream = TokenStream::new(&tokens, &transformed);
        let root = parse_fragment(&mut stream)?;

        let session = ParseSession::new(&transformed, context, offset_adjust, &self.registry);
        session.parse_node(&root)
    }

    /// Number of cached expressions, for diagnostics.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

/// Strips the `$:` function prefix.
fn strip_function_prefix(source: &str) -> &str {
    let trimmed = source.trim_start();
    trimmed.strip_prefix("$:").unwrap_or(trimmed)
}
