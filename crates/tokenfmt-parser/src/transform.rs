//! Source-level transformers applied before the expression grammar.
//!
//! Transformers rewrite an expression fragment so the downstream
//! grammar can parse format-string specific syntax natively. They run
//! in a fixed pipeline order and are idempotent on already-transformed
//! input.

use regex::Regex;
use std::sync::LazyLock;

/// A source-to-source rewrite applied before parsing.
pub trait SourceTransformer: Send + Sync {
    /// Transformer name for diagnostics.
    fn name(&self) -> &'static str;

    /// Rewrites the fragment. Must be idempotent.
    fn transform(&self, source: &str) -> String;
}

/// Matches `path:spec` where the whole pre-colon text is a bare dotted
/// path. Anything else (quotes, calls, ternaries, object literals) is
/// left alone, which is also what keeps function tokens from ever
/// gaining a specifier. The deprecated `?` marker is a format-string
/// level construct and is stripped by the tokenizer before a fragment
/// reaches this pipeline.
static FORMAT_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*)\s*:\s*([^\s:]+)\s*$")
        .expect("format specifier regex is valid")
});

/// True when the fragment carries a trailing format specifier the
/// transformer would rewrite.
pub fn has_format_specifier(source: &str) -> bool {
    FORMAT_SPECIFIER.is_match(source)
}

/// Rewrites a trailing `:format` suffix into an assignment statement
/// the grammar can parse natively: `value:0n` becomes
/// `{ value; $format = "0n" }`.
pub struct FormatSpecifierTransformer;

impl SourceTransformer for FormatSpecifierTransformer {
    fn name(&self) -> &'static str {
        "format-specifier"
    }

    fn transform(&self, source: &str) -> String {
        match FORMAT_SPECIFIER.captures(source) {
            Some(captures) => {
                let path = &captures[1];
                let specifier = &captures[2];
                format!("{{ {path}; $format = \"{specifier}\" }}")
            }
            None => source.to_string(),
        }
    }
}

/// Wraps the fragment in a block unless it is already brace-delimited.
pub struct BlockStatementTransformer;

impl SourceTransformer for BlockStatementTransformer {
    fn name(&self) -> &'static str {
        "block-statement"
    }

    fn transform(&self, source: &str) -> String {
        let trimmed = source.trim();
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            source.to_string()
        } else {
            format!("{{ {source} }}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_specifier_rewrite() {
        let t = FormatSpecifierTransformer;
        assert_eq!(t.transform("value:0n"), "{ value; $format = \"0n\" }");
        assert_eq!(t.transform("price:.2f"), "{ price; $format = \".2f\" }");
        assert_eq!(
            t.transform("room.building.area:.1f"),
            "{ room.building.area; $format = \".1f\" }"
        );
    }

    #[test]
    fn test_format_specifier_ignores_non_paths() {
        let t = FormatSpecifierTransformer;
        assert_eq!(t.transform("a ? b : c"), "a ? b : c");
        assert_eq!(t.transform("fn(a):0n"), "fn(a):0n");
        assert_eq!(t.transform("{a: 1}"), "{a: 1}");
        assert_eq!(t.transform("'a:b'"), "'a:b'");
    }

    #[test]
    fn test_format_specifier_idempotent() {
        let t = FormatSpecifierTransformer;
        let once = t.transform("value:0n");
        assert_eq!(t.transform(&once), once);
    }

    #[test]
    fn test_block_wrap() {
        let t = BlockStatementTransformer;
        assert_eq!(t.transform("a.b"), "{ a.b }");
    }

    #[test]
    fn test_block_wrap_idempotent() {
        let t = BlockStatementTransformer;
        assert_eq!(t.transform("{ a.b }"), "{ a.b }");
        assert_eq!(t.transform("{a: 1}"), "{a: 1}");
    }
}
