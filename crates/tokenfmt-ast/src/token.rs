//! Token-expression AST.
//!
//! The closed set of expression node variants a compiled display format
//! is made of. Nodes are immutable after construction and carry the
//! source fragment they were parsed from (prefix-stripped for function
//! tokens) plus an optional source offset for error reporting.
//!
//! # Design
//!
//! - `TokenExpression` — the variant enum, one per token kind
//! - classification flags (`is_constant` / `is_shorthand` /
//!   `is_function` / `is_primitive`) are mutually informative: they let
//!   evaluators and validators dispatch without matching every variant
//! - `stringify` round-trips a token back to format-string syntax
//!   (re-escaping braces in constant text)
//! - evaluation is asynchronous per token; the synchronous path is a
//!   best-effort projection that never suspends and never fetches

use crate::error::{EvalError, EvalResult};
use crate::format::format_value;
use crate::scope::Scope;
use crate::value::{Lookup, Value};
use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Synthetic callee used when lowering a conditional expression.
///
/// Conditionals are not a dedicated AST variant: they lower to a
/// function token calling this immediately-invoked function, keeping
/// the host's function-calling path the single executable primitive.
pub const TERNARY_FUNCTION: &str =
    "(function(test, consequent, alternate) { return test ? consequent : alternate; })";

/// Non-string constant payload of a primitive constant token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    /// Null literal
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(f64),
}

impl PrimitiveValue {
    /// Converts to a runtime value.
    pub fn to_value(&self) -> Value {
        match self {
            PrimitiveValue::Null => Value::Null,
            PrimitiveValue::Bool(b) => Value::Bool(*b),
            PrimitiveValue::Number(n) => Value::Number(*n),
        }
    }
}

/// Literal text token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantToken {
    /// Literal value (braces already unescaped)
    pub value: String,
    /// Source offset
    pub start: Option<usize>,
}

impl ConstantToken {
    /// Creates a constant token.
    pub fn new(value: impl Into<String>, start: Option<usize>) -> Self {
        Self {
            value: value.into(),
            start,
        }
    }

    /// Merges an adjacent constant into this one.
    ///
    /// Keeps the left token's source offset.
    pub fn concat(&self, other: &ConstantToken) -> ConstantToken {
        ConstantToken {
            value: format!("{}{}", self.value, other.value),
            start: self.start,
        }
    }
}

/// Constant token whose underlying value is non-string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveConstantToken {
    /// Source fragment (e.g. `3.25`, `true`)
    pub expression: String,
    /// Parsed primitive value
    pub value: PrimitiveValue,
    /// Source offset
    pub start: Option<usize>,
}

/// Dotted-path reference into the scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShorthandToken {
    /// Path as written, possibly with the deprecated leading `?`
    pub expression: String,
    /// Source offset
    pub start: Option<usize>,
}

impl ShorthandToken {
    /// Creates a shorthand token.
    pub fn new(expression: impl Into<String>, start: Option<usize>) -> Self {
        Self {
            expression: expression.into(),
            start,
        }
    }

    /// True if the path carries the deprecated leading `?` marker.
    pub fn has_optional_marker(&self) -> bool {
        self.expression.starts_with('?')
    }

    /// Path with the deprecated marker stripped.
    pub fn path(&self) -> &str {
        self.expression.strip_prefix('?').unwrap_or(&self.expression)
    }
}

/// Shorthand plus a format specifier (`{price:.2f}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatShorthandToken {
    /// Path as written, possibly with the deprecated leading `?`
    pub expression: String,
    /// Format specifier (the text after the `:`)
    pub format: String,
    /// Source offset
    pub start: Option<usize>,
}

impl FormatShorthandToken {
    /// Creates a format-shorthand token.
    pub fn new(
        expression: impl Into<String>,
        format: impl Into<String>,
        start: Option<usize>,
    ) -> Self {
        Self {
            expression: expression.into(),
            format: format.into(),
            start,
        }
    }

    /// True if the path carries the deprecated leading `?` marker.
    pub fn has_optional_marker(&self) -> bool {
        self.expression.starts_with('?')
    }

    /// Path with the deprecated marker stripped.
    pub fn path(&self) -> &str {
        self.expression.strip_prefix('?').unwrap_or(&self.expression)
    }
}

/// Call expression, ternary, logical expression, or any construct not
/// representable as a pure path reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionToken {
    /// Source fragment with the `$:` prefix stripped
    pub expression: String,
    /// Callee name (dotted), or the operator/lowered callee for
    /// non-call constructs
    pub name: String,
    /// Argument sub-expressions in call order
    pub arguments: Vec<TokenExpression>,
    /// Source offset
    pub start: Option<usize>,
}

impl FunctionToken {
    /// Degrades this token to a constant carrying its own source.
    ///
    /// Used where function evaluation is unavailable (the synchronous
    /// evaluator, or call sites that disallow functions).
    pub fn to_constant(&self) -> ConstantToken {
        ConstantToken::new(format!("{{$:{}}}", self.expression), self.start)
    }
}

/// Backward-compatible function reference without the `$:` prefix.
///
/// Exists only for literal round-tripping of old schemas; evaluating it
/// is an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyFunctionToken {
    /// Source fragment
    pub expression: String,
    /// Source offset
    pub start: Option<usize>,
}

/// Object-literal structural token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectToken {
    /// Source fragment
    pub expression: String,
    /// Named member sub-expressions in source order
    pub members: IndexMap<String, TokenExpression>,
    /// Source offset
    pub start: Option<usize>,
}

/// Array-literal structural token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayToken {
    /// Source fragment
    pub expression: String,
    /// Indexed sub-expressions in source order
    pub items: Vec<TokenExpression>,
    /// Source offset
    pub start: Option<usize>,
}

/// A single token of a compiled format string or expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenExpression {
    /// Literal text
    Constant(ConstantToken),
    /// Non-string literal
    PrimitiveConstant(PrimitiveConstantToken),
    /// Dotted-path reference
    Shorthand(ShorthandToken),
    /// Dotted-path reference with format specifier
    FormatShorthand(FormatShorthandToken),
    /// Function call / ternary / logical expression
    Function(FunctionToken),
    /// Legacy function reference (round-trip only)
    LegacyFunction(LegacyFunctionToken),
    /// Object literal
    Object(ObjectToken),
    /// Array literal
    Array(ArrayToken),
}

/// Escape literal text back into format-string syntax.
fn escape(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

/// Resolves the reserved root-path literals `null`, `true`, `false`.
///
/// Checked only at depth 0 of a path; member access on a reserved
/// primitive yields null.
fn reserved_literal(path: &str) -> Option<Value> {
    let (root, rest) = match path.split_once('.') {
        Some((root, rest)) => (root, Some(rest)),
        None => (path, None),
    };
    let value = match root {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => return None,
    };
    Some(if rest.is_some() { Value::Null } else { value })
}

impl TokenExpression {
    /// The source fragment this token was parsed from.
    pub fn expression(&self) -> &str {
        match self {
            TokenExpression::Constant(t) => &t.value,
            TokenExpression::PrimitiveConstant(t) => &t.expression,
            TokenExpression::Shorthand(t) => &t.expression,
            TokenExpression::FormatShorthand(t) => &t.expression,
            TokenExpression::Function(t) => &t.expression,
            TokenExpression::LegacyFunction(t) => &t.expression,
            TokenExpression::Object(t) => &t.expression,
            TokenExpression::Array(t) => &t.expression,
        }
    }

    /// Source offset for error reporting.
    pub fn start(&self) -> Option<usize> {
        match self {
            TokenExpression::Constant(t) => t.start,
            TokenExpression::PrimitiveConstant(t) => t.start,
            TokenExpression::Shorthand(t) => t.start,
            TokenExpression::FormatShorthand(t) => t.start,
            TokenExpression::Function(t) => t.start,
            TokenExpression::LegacyFunction(t) => t.start,
            TokenExpression::Object(t) => t.start,
            TokenExpression::Array(t) => t.start,
        }
    }

    /// Format specifier, if this token carries one.
    pub fn format(&self) -> Option<&str> {
        match self {
            TokenExpression::FormatShorthand(t) => Some(&t.format),
            _ => None,
        }
    }

    /// True for tokens requiring no evaluation.
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            TokenExpression::Constant(_) | TokenExpression::PrimitiveConstant(_)
        )
    }

    /// True for dotted-path references.
    pub fn is_shorthand(&self) -> bool {
        matches!(
            self,
            TokenExpression::Shorthand(_) | TokenExpression::FormatShorthand(_)
        )
    }

    /// True for tokens requiring invocation beyond plain path lookup.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            TokenExpression::Function(_) | TokenExpression::LegacyFunction(_)
        )
    }

    /// True for constants whose underlying value is non-string.
    pub fn is_primitive(&self) -> bool {
        matches!(self, TokenExpression::PrimitiveConstant(_))
    }

    /// Renders this token back to format-string syntax.
    pub fn stringify(&self) -> String {
        match self {
            TokenExpression::Constant(t) => escape(&t.value),
            TokenExpression::PrimitiveConstant(t) => t.expression.clone(),
            TokenExpression::Shorthand(t) => format!("{{{}}}", t.expression),
            TokenExpression::FormatShorthand(t) => format!("{{{}:{}}}", t.expression, t.format),
            TokenExpression::Function(t) => format!("{{$:{}}}", t.expression),
            TokenExpression::LegacyFunction(t) => format!("{{{}}}", t.expression),
            TokenExpression::Object(t) => t.expression.clone(),
            TokenExpression::Array(t) => t.expression.clone(),
        }
    }

    /// Evaluates this token to a raw value, fetching missing data
    /// through the scope.
    pub fn evaluate_future<'a>(&'a self, scope: &'a dyn Scope) -> BoxFuture<'a, EvalResult<Value>> {
        match self {
            TokenExpression::Constant(t) => {
                let value = Value::String(t.value.clone());
                async move { Ok(value) }.boxed()
            }
            TokenExpression::PrimitiveConstant(t) => {
                let value = t.value.to_value();
                async move { Ok(value) }.boxed()
            }
            TokenExpression::Shorthand(t) => resolve_path_future(scope, t.path()),
            TokenExpression::FormatShorthand(t) => resolve_path_future(scope, t.path()),
            TokenExpression::Function(t) => scope.evaluate_function_expression(&t.expression),
            TokenExpression::LegacyFunction(t) => {
                let expression = t.expression.clone();
                async move { Err(EvalError::LegacyFunction(expression)) }.boxed()
            }
            TokenExpression::Object(t) => async move {
                let values =
                    futures::future::try_join_all(t.members.values().map(|m| m.evaluate_future(scope)))
                        .await?;
                Ok(Value::Map(
                    t.members.keys().cloned().zip(values).collect(),
                ))
            }
            .boxed(),
            TokenExpression::Array(t) => async move {
                let values =
                    futures::future::try_join_all(t.items.iter().map(|i| i.evaluate_future(scope)))
                        .await?;
                Ok(Value::Array(values))
            }
            .boxed(),
        }
    }

    /// Evaluates this token to its display string, fetching missing
    /// data through the scope.
    ///
    /// Object values prefer their own display string over generic
    /// formatting, which makes relationship rendering recursive.
    pub fn display_future<'a>(&'a self, scope: &'a dyn Scope) -> BoxFuture<'a, EvalResult<String>> {
        match self {
            TokenExpression::Constant(t) => {
                let value = t.value.clone();
                async move { Ok(value) }.boxed()
            }
            _ => async move {
                let value = self.evaluate_future(scope).await?;
                match value {
                    Value::Object(object) => object.display_future().await,
                    value => {
                        let ty = self
                            .shorthand_path()
                            .and_then(|path| scope.expression_type(path));
                        Ok(format_value(&value, self.format(), ty.as_ref()))
                    }
                }
            }
            .boxed(),
        }
    }

    /// Best-effort synchronous display string.
    ///
    /// Never fetches and never suspends. Returns `None` when any
    /// dependency is not loaded yet; function and structural tokens
    /// degrade to their constant (source) representation.
    pub fn display_cached(&self, scope: &dyn Scope) -> Option<String> {
        match self {
            TokenExpression::Constant(t) => Some(t.value.clone()),
            TokenExpression::PrimitiveConstant(t) => {
                Some(format_value(&t.value.to_value(), None, None))
            }
            TokenExpression::Shorthand(_) | TokenExpression::FormatShorthand(_) => {
                let path = self.shorthand_path()?;
                let value = match reserved_literal(path) {
                    Some(value) => value,
                    None => match scope.get_value(path) {
                        Lookup::Loaded(value) => value,
                        Lookup::NotLoaded => return None,
                    },
                };
                match value {
                    Value::Object(object) => match object.display_cached() {
                        Lookup::Loaded(display) => Some(format_value(&display, None, None)),
                        Lookup::NotLoaded => None,
                    },
                    value => {
                        let ty = scope.expression_type(path);
                        Some(format_value(&value, self.format(), ty.as_ref()))
                    }
                }
            }
            TokenExpression::Function(t) => Some(t.to_constant().value),
            TokenExpression::LegacyFunction(_)
            | TokenExpression::Object(_)
            | TokenExpression::Array(_) => Some(self.stringify()),
        }
    }

    /// Dotted path of shorthand tokens, with the deprecated marker
    /// stripped.
    pub fn shorthand_path(&self) -> Option<&str> {
        match self {
            TokenExpression::Shorthand(t) => Some(t.path()),
            TokenExpression::FormatShorthand(t) => Some(t.path()),
            _ => None,
        }
    }
}

/// Resolves a dotted path asynchronously, honoring reserved literals.
fn resolve_path_future<'a>(scope: &'a dyn Scope, path: &'a str) -> BoxFuture<'a, EvalResult<Value>> {
    match reserved_literal(path) {
        Some(value) => async move { Ok(value) }.boxed(),
        None => scope.get_value_future(path),
    }
}
