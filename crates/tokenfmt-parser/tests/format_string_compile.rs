//! End-to-end tokenization tests for display-format strings.
//!
//! Covers the user-facing mini-language:
//! - shorthand and format-shorthand tokens
//! - `$:` function expressions (routed through the expression grammar)
//! - brace escaping and fail-soft handling of malformed braces
//! - constant merging and the constant short-circuit

use tokenfmt_ast::{FormatString, TokenExpression};
use tokenfmt_parser::format_string::compile;
use tokenfmt_parser::TokenExpressionParser;

/// Helper to compile a source with a fresh parser.
fn compile_ok(source: &str) -> FormatString {
    let parser = TokenExpressionParser::new();
    compile(source, &parser).expect("compile failed")
}

// =============================================================================
// Token shapes
// =============================================================================

#[test]
fn test_typical_display_format() {
    let fs = compile_ok("{make} {model} ({price:.2f})");
    let tokens = fs.tokens();
    assert_eq!(tokens.len(), 6);
    assert!(tokens[0].is_shorthand());
    assert_eq!(tokens[1].expression(), " ");
    assert!(tokens[2].is_shorthand());
    assert_eq!(tokens[3].expression(), " (");
    assert_eq!(tokens[4].format(), Some(".2f"));
    assert_eq!(tokens[5].expression(), ")");
}

#[test]
fn test_shorthand_offsets_point_into_source() {
    let source = "R{price:.2f}!";
    let fs = compile_ok(source);
    let fmt = &fs.tokens()[1];
    assert_eq!(fmt.start(), Some(2));
    assert_eq!(&source[2..7], "price");
}

#[test]
fn test_function_token_via_prefix() {
    let fs = compile_ok("{$:concat(make, ' ', model)}");
    let tokens = fs.tokens();
    assert_eq!(tokens.len(), 1);
    let TokenExpression::Function(function) = &tokens[0] else {
        panic!("expected function token");
    };
    assert_eq!(function.name, "concat");
    assert_eq!(function.arguments.len(), 3);
}

#[test]
fn test_legacy_function_round_trips_only() {
    let fs = compile_ok("{substring(name, 0, 3)}");
    let TokenExpression::LegacyFunction(legacy) = &fs.tokens()[0] else {
        panic!("expected legacy function token");
    };
    assert_eq!(legacy.expression, "substring(name, 0, 3)");
    assert_eq!(fs.stringify(), "{substring(name, 0, 3)}");
}

// =============================================================================
// Escaping and malformed input
// =============================================================================

#[test]
fn test_escaped_braces_produce_literal_text() {
    let fs = compile_ok("{{x}}");
    assert!(fs.is_constant());
    assert_eq!(fs.constant_value().expect("constant"), "{x}");
}

#[test]
fn test_stringify_reescapes_constants() {
    let fs = compile_ok("{{x}}");
    // Round-trip of meaning: re-compiling the stringified form yields
    // the same constant.
    let again = compile_ok(&fs.stringify());
    assert_eq!(
        again.constant_value().expect("constant"),
        fs.constant_value().expect("constant")
    );
}

#[test]
fn test_unclosed_brace_is_fail_soft() {
    let fs = compile_ok("Hello {person.name");
    assert!(fs.is_constant());
    assert_eq!(fs.constant_value().expect("constant"), "Hello {person.name");
}

#[test]
fn test_quoted_close_brace_inside_function() {
    let fs = compile_ok("{ $:fn({a: '}'}) }");
    assert_eq!(fs.tokens().len(), 1);
    assert!(fs.tokens()[0].is_function());
}

#[test]
fn test_bad_function_syntax_is_an_error() {
    let parser = TokenExpressionParser::new();
    assert!(compile("{$:fn(,)}", &parser).is_err());
}

// =============================================================================
// Constant handling
// =============================================================================

#[test]
fn test_adjacent_constants_merge_into_one() {
    let fs = compile_ok("a{{b{{c");
    assert_eq!(fs.tokens().len(), 1);
    assert_eq!(fs.constant_value().expect("constant"), "a{b{c");
}

#[test]
fn test_constants_never_merge_across_tokens() {
    let fs = compile_ok("a{name}b");
    assert_eq!(fs.tokens().len(), 3);
}

#[test]
fn test_constant_short_circuit_flag() {
    assert!(compile_ok("static text").is_constant());
    assert!(!compile_ok("{name}").is_constant());
}
