//! Integration tests for the expression grammar and its contextual
//! transforms.
//!
//! Exercises the full fragment pipeline: context inference, source
//! transformers, lexing, parsing, and node dispatch.

use tokenfmt_ast::{PrimitiveValue, TokenExpression, TERNARY_FUNCTION};
use tokenfmt_parser::TokenExpressionParser;

/// Helper returning the parsed token, panicking on error.
fn parse(source: &str) -> TokenExpression {
    TokenExpressionParser::new()
        .parse(source)
        .expect("parse failed")
        .as_ref()
        .clone()
}

// =============================================================================
// Shorthands and literals
// =============================================================================

#[test]
fn test_dotted_path_is_shorthand() {
    let TokenExpression::Shorthand(token) = parse("room.building.name") else {
        panic!("expected shorthand");
    };
    assert_eq!(token.expression, "room.building.name");
}

#[test]
fn test_trailing_specifier_becomes_format_shorthand() {
    let TokenExpression::FormatShorthand(token) = parse("area:.1f") else {
        panic!("expected format shorthand");
    };
    assert_eq!(token.expression, "area");
    assert_eq!(token.format, ".1f");
}

#[test]
fn test_literals() {
    assert!(matches!(
        parse("'hello'"),
        TokenExpression::Constant(token) if token.value == "hello"
    ));
    assert!(matches!(
        parse("3.25"),
        TokenExpression::PrimitiveConstant(token)
            if token.value == PrimitiveValue::Number(3.25)
    ));
    assert!(matches!(
        parse("true"),
        TokenExpression::PrimitiveConstant(token)
            if token.value == PrimitiveValue::Bool(true)
    ));
    assert!(matches!(
        parse("null"),
        TokenExpression::PrimitiveConstant(token)
            if token.value == PrimitiveValue::Null
    ));
}

// =============================================================================
// Function expressions and lowering
// =============================================================================

#[test]
fn test_call_arguments_parse_recursively() {
    let TokenExpression::Function(function) = parse("$:pad(name, 8, '.')") else {
        panic!("expected function");
    };
    assert_eq!(function.name, "pad");
    assert_eq!(function.arguments.len(), 3);
    assert!(function.arguments[0].is_shorthand());
    assert!(function.arguments[1].is_primitive());
    assert!(function.arguments[2].is_constant());
}

#[test]
fn test_dotted_callee() {
    let TokenExpression::Function(function) = parse("$:str.upper(name)") else {
        panic!("expected function");
    };
    assert_eq!(function.name, "str.upper");
}

#[test]
fn test_ternary_lowers_to_synthetic_call() {
    let TokenExpression::Function(function) = parse("active ? 'on' : 'off'") else {
        panic!("expected function");
    };
    assert_eq!(function.name, TERNARY_FUNCTION);
    assert_eq!(function.arguments.len(), 3);
}

#[test]
fn test_nested_ternary_is_right_associative() {
    let TokenExpression::Function(outer) = parse("a ? b : c ? d : e") else {
        panic!("expected function");
    };
    assert_eq!(outer.name, TERNARY_FUNCTION);
    let TokenExpression::Function(alternate) = &outer.arguments[2] else {
        panic!("expected nested conditional in alternate position");
    };
    assert_eq!(alternate.name, TERNARY_FUNCTION);
}

#[test]
fn test_logical_operators_become_functions() {
    let TokenExpression::Function(function) = parse("a && b") else {
        panic!("expected function");
    };
    assert_eq!(function.name, "&&");
    assert_eq!(function.arguments.len(), 2);
}

// =============================================================================
// Structural literals
// =============================================================================

#[test]
fn test_object_literal_preserves_member_order() {
    let TokenExpression::Object(object) = parse("{z: 1, a: 2, m: name}") else {
        panic!("expected object");
    };
    let keys: Vec<&str> = object.members.keys().map(String::as_str).collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_array_literal() {
    let TokenExpression::Array(array) = parse("[1, name, 'x']") else {
        panic!("expected array");
    };
    assert_eq!(array.items.len(), 3);
    assert!(array.items[1].is_shorthand());
}

// =============================================================================
// Contexts and transformers
// =============================================================================

#[test]
fn test_bare_identifier_depends_on_context() {
    assert!(matches!(parse("now"), TokenExpression::Shorthand(_)));
    assert!(matches!(parse("$:now"), TokenExpression::Function(_)));
}

#[test]
fn test_specifier_on_function_expression_is_rejected() {
    let parser = TokenExpressionParser::new();
    assert!(parser.parse("$:foo():0n").is_err());
}

#[test]
fn test_reparse_of_transformed_form_is_stable() {
    // Parsing the already-wrapped form yields the same token as the
    // bare fragment: the transformer pipeline is idempotent.
    assert_eq!(parse("{ room.name }"), {
        let TokenExpression::Shorthand(token) = parse("room.name") else {
            panic!("expected shorthand");
        };
        let mut expected = token;
        expected.start = Some(2);
        TokenExpression::Shorthand(expected)
    });
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unterminated_call_is_fatal() {
    let parser = TokenExpressionParser::new();
    assert!(parser.parse("$:fn(a, b").is_err());
}

#[test]
fn test_two_statements_are_rejected() {
    let parser = TokenExpressionParser::new();
    assert!(parser.parse("{ a; b }").is_err());
}
