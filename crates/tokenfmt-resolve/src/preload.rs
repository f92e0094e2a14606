//! Relationship-structure extraction.
//!
//! Builds a nested "preload plan" from a compiled format string: the
//! set of relationships that must be fetched before the synchronous
//! evaluator can succeed without hitting the not-loaded sentinel.
//! Whenever a path segment is a relationship, the related type's own
//! display format is folded in too, since rendering the relationship's
//! label may reference further relationships.

use crate::schema::{Member, TypeRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokenfmt_ast::{FormatString, TokenExpression};
use tokenfmt_parser::format_string::compile;
use tokenfmt_parser::TokenExpressionParser;

/// Nesting limit on relationship chains.
///
/// Every relationship hop counts, whether it comes from a dotted path
/// or from display-format indirection. Past this depth the result is
/// simply empty, so cyclic display formats bound out instead of
/// failing.
pub const MAX_PRELOAD_DEPTH: usize = 5;

/// Nested map of relationships to preload, keyed by member name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadTree {
    relations: IndexMap<String, PreloadTree>,
}

impl PreloadTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing needs preloading.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Relationships at this level, in first-seen order.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &PreloadTree)> {
        self.relations
            .iter()
            .map(|(name, child)| (name.as_str(), child))
    }

    /// Child subtree for a relationship, if present.
    pub fn get(&self, name: &str) -> Option<&PreloadTree> {
        self.relations.get(name)
    }

    /// Unions another tree into this one.
    pub fn merge(&mut self, other: PreloadTree) {
        for (name, child) in other.relations {
            self.relations.entry(name).or_default().merge(child);
        }
    }

    fn child(&mut self, name: &str) -> &mut PreloadTree {
        self.relations.entry(name.to_string()).or_default()
    }
}

/// Extracts the preload plan for a format string rendered against a
/// root type.
///
/// Purely structural: unknown members or types contribute nothing (the
/// validator is where they become diagnostics).
pub fn extract(
    format: &FormatString,
    registry: &TypeRegistry,
    root_type: &str,
    parser: &TokenExpressionParser,
) -> PreloadTree {
    let mut tree = PreloadTree::new();
    extract_into(format, registry, root_type, parser, 0, &mut tree);
    tree
}

fn extract_into(
    format: &FormatString,
    registry: &TypeRegistry,
    root_type: &str,
    parser: &TokenExpressionParser,
    depth: usize,
    tree: &mut PreloadTree,
) {
    if depth >= MAX_PRELOAD_DEPTH {
        tracing::debug!(root_type, depth, "preload recursion limit reached");
        return;
    }
    for token in format.tokens() {
        extract_token(token, registry, root_type, parser, depth, tree);
    }
}

fn extract_token(
    token: &TokenExpression,
    registry: &TypeRegistry,
    root_type: &str,
    parser: &TokenExpressionParser,
    depth: usize,
    tree: &mut PreloadTree,
) {
    match token {
        TokenExpression::Shorthand(_) | TokenExpression::FormatShorthand(_) => {
            if let Some(path) = token.shorthand_path() {
                extract_path(path, registry, root_type, parser, depth, tree);
            }
        }
        TokenExpression::Function(function) => {
            for argument in &function.arguments {
                extract_token(argument, registry, root_type, parser, depth, tree);
            }
        }
        TokenExpression::Object(object) => {
            for member in object.members.values() {
                extract_token(member, registry, root_type, parser, depth, tree);
            }
        }
        TokenExpression::Array(array) => {
            for item in &array.items {
                extract_token(item, registry, root_type, parser, depth, tree);
            }
        }
        TokenExpression::Constant(_)
        | TokenExpression::PrimitiveConstant(_)
        | TokenExpression::LegacyFunction(_) => {}
    }
}

/// Walks one dotted path, recording every relationship hop.
fn extract_path(
    path: &str,
    registry: &TypeRegistry,
    root_type: &str,
    parser: &TokenExpressionParser,
    depth: usize,
    tree: &mut PreloadTree,
) {
    let Some(mut current) = registry.get(root_type) else {
        return;
    };
    let mut cursor: &mut PreloadTree = tree;
    let mut hops = depth;

    for segment in path.split('.') {
        match current.member(segment) {
            Some(Member::Relationship(target)) => {
                if hops >= MAX_PRELOAD_DEPTH {
                    tracing::debug!(path, "preload recursion limit reached");
                    return;
                }
                hops += 1;
                let target = target.clone();
                cursor = cursor.child(segment);
                // The relationship renders via its own display format;
                // fold that format's needs into the subtree.
                if let Some(descriptor) = registry.get(&target) {
                    if let Some(display) = descriptor.display_format.clone() {
                        if let Ok(display_format) = compile(&display, parser) {
                            extract_into(
                                &display_format,
                                registry,
                                &target,
                                parser,
                                hops,
                                cursor,
                            );
                        }
                    }
                    current = descriptor;
                } else {
                    return;
                }
            }
            Some(Member::Attribute(_)) | None => return,
        }
    }
}
