//! Parse-context inference.
//!
//! Before a fragment is transformed and parsed, an ordered factory
//! chain inspects the raw source to decide how ambiguous syntax should
//! be classified — e.g. whether a bare identifier is a field path or a
//! call target. Context selection is a pure function of source text;
//! the first factory that recognizes the source wins, and at most one
//! context applies per parse.

/// Interpretive context of an expression fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseContext {
    /// No special interpretation.
    #[default]
    Default,
    /// The fragment is a `$:` function expression: bare identifiers are
    /// call targets, not field paths, and trailing format specifiers
    /// are rejected rather than rewritten.
    FunctionExpression,
    /// The fragment is a brace-delimited format expression: a trailing
    /// format specifier is meaningful and rewritten for the grammar.
    FormatExpression,
}

impl ParseContext {
    /// True when the format-specifier transformer should run.
    pub fn allows_format_specifier(self) -> bool {
        matches!(self, ParseContext::Default | ParseContext::FormatExpression)
    }

    /// True when a bare identifier names a function rather than a
    /// field path.
    pub fn identifiers_are_functions(self) -> bool {
        matches!(self, ParseContext::FunctionExpression)
    }
}

/// A single context-recognition rule.
pub type ParseContextFactory = fn(&str) -> Option<ParseContext>;

/// Recognizes `$:`-prefixed function expressions.
fn function_expression_context(source: &str) -> Option<ParseContext> {
    source
        .trim_start()
        .starts_with("$:")
        .then_some(ParseContext::FunctionExpression)
}

/// Recognizes fragments carrying a trailing format specifier.
fn format_expression_context(source: &str) -> Option<ParseContext> {
    crate::transform::has_format_specifier(source).then_some(ParseContext::FormatExpression)
}

/// The fixed factory chain, in application order.
pub fn context_factories() -> &'static [ParseContextFactory] {
    &[function_expression_context, format_expression_context]
}

/// Runs the factory chain over a raw source fragment.
pub fn infer_context(source: &str) -> ParseContext {
    for factory in context_factories() {
        if let Some(context) = factory(source) {
            return context;
        }
    }
    ParseContext::Default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_expression_context() {
        assert_eq!(infer_context("$:fn(a, b)"), ParseContext::FunctionExpression);
        assert_eq!(infer_context("  $:fn()"), ParseContext::FunctionExpression);
    }

    #[test]
    fn test_format_expression_context() {
        assert_eq!(infer_context("price:.2f"), ParseContext::FormatExpression);
    }

    #[test]
    fn test_default_context() {
        assert_eq!(infer_context("room.name"), ParseContext::Default);
        assert_eq!(infer_context("a ? b : c"), ParseContext::Default);
    }

    #[test]
    fn test_function_context_wins_over_format() {
        // `$:foo():0n` stays a function expression; the specifier is
        // rejected later by the grammar instead of being rewritten.
        assert_eq!(infer_context("$:foo():0n"), ParseContext::FunctionExpression);
    }
}
