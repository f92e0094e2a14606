//! Format-string tokenizer.
//!
//! Scans a display-format source like `"{make} {model} ({price:.2f})"`
//! into an ordered token list. Only the `$:` function syntax routes
//! through the expression grammar; shorthand paths are recognized
//! directly here.
//!
//! Escape rules: `{{` is a literal `{`; a doubled `}}` in constant text
//! is a literal `}`. Only opening braces need doubling to escape.

use crate::brace::match_brace;
use crate::error::ParseError;
use crate::parser::TokenExpressionParser;
use regex::Regex;
use std::sync::LazyLock;
use tokenfmt_ast::{
    ConstantToken, FormatShorthandToken, FormatString, LegacyFunctionToken, ShorthandToken,
    TokenExpression,
};

/// Old-schema function reference: a call without the `$:` prefix.
/// Recognized only for round-tripping; evaluation is unsupported.
static LEGACY_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*\(.*\)$")
        .expect("legacy function regex is valid")
});

/// Compiles a format-string source into its token sequence.
///
/// Never fails on malformed braces: an unclosed `{` turns the rest of
/// the source into literal text. Only a `$:` fragment that fails the
/// expression grammar is a hard error.
pub fn compile(source: &str, parser: &TokenExpressionParser) -> Result<FormatString, ParseError> {
    let mut tokens: Vec<TokenExpression> = Vec::new();
    let bytes = source.as_bytes();
    let mut cursor = 0;
    let mut constant_from = 0;

    while cursor < bytes.len() {
        if bytes[cursor] != b'{' {
            cursor += 1;
            continue;
        }
        if bytes.get(cursor + 1) == Some(&b'{') {
            // Escaped opening brace: constant text up to and including
            // one literal `{`.
            push_constant(&mut tokens, &source[constant_from..cursor], "{", constant_from);
            cursor += 2;
            constant_from = cursor;
            continue;
        }
        let Some(close) = match_brace(&source[cursor..]) else {
            // No closing brace: the rest of the source is literal text.
            break;
        };
        push_constant(&mut tokens, &source[constant_from..cursor], "", constant_from);
        let spec = &source[cursor + 1..cursor + close];
        tokens.push(parse_spec(spec, cursor + 1, parser)?);
        cursor += close + 1;
        constant_from = cursor;
    }

    if constant_from < source.len() || tokens.is_empty() {
        push_constant(&mut tokens, &source[constant_from..], "", constant_from);
        if tokens.is_empty() {
            tokens.push(TokenExpression::Constant(ConstantToken::new("", Some(0))));
        }
    }

    Ok(FormatString::new(source, merge_constants(tokens)))
}

/// Classifies one brace-pair interior.
fn parse_spec(
    spec: &str,
    start: usize,
    parser: &TokenExpressionParser,
) -> Result<TokenExpression, ParseError> {
    let trimmed = spec.trim();

    if trimmed.starts_with("$:") {
        let expression = parser.parse(trimmed)?;
        // Nested offsets are relative to the prefix-stripped fragment:
        // shift past any leading whitespace and the `$:` prefix itself.
        let leading = spec.len() - spec.trim_start().len();
        return Ok(reposition(
            expression.as_ref().clone(),
            start,
            start + leading + 2,
        ));
    }

    if LEGACY_FUNCTION.is_match(trimmed) {
        return Ok(TokenExpression::LegacyFunction(LegacyFunctionToken {
            expression: trimmed.to_string(),
            start: Some(start),
        }));
    }

    let token = match split_unenclosed_colon(trimmed) {
        Some((path, format)) => TokenExpression::FormatShorthand(FormatShorthandToken::new(
            path.trim(),
            format.trim(),
            Some(start),
        )),
        None => TokenExpression::Shorthand(ShorthandToken::new(trimmed, Some(start))),
    };
    if let Some(path) = token.shorthand_path() {
        if token.expression().starts_with('?') {
            tracing::warn!(path, "deprecated optional marker `?` in shorthand path");
        }
    }
    Ok(token)
}

/// Splits at the first `:` not inside a quoted string.
fn split_unenclosed_colon(spec: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (index, ch) in spec.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None if ch == ':' => return Some((&spec[..index], &spec[index + 1..])),
            None => {}
        }
    }
    None
}

/// Appends accumulated constant text (plus an optional literal suffix),
/// unescaping doubled closing braces.
fn push_constant(tokens: &mut Vec<TokenExpression>, text: &str, suffix: &str, start: usize) {
    if text.is_empty() && suffix.is_empty() {
        return;
    }
    let value = format!("{}{}", text.replace("}}", "}"), suffix);
    tokens.push(TokenExpression::Constant(ConstantToken::new(
        value,
        Some(start),
    )));
}

/// Merges consecutive constants; never across a non-constant token.
fn merge_constants(tokens: Vec<TokenExpression>) -> Vec<TokenExpression> {
    let mut merged: Vec<TokenExpression> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let (Some(TokenExpression::Constant(previous)), TokenExpression::Constant(next)) =
            (merged.last_mut(), &token)
        {
            *previous = previous.concat(next);
            continue;
        }
        merged.push(token);
    }
    merged
}

/// Rebases a cached expression's offsets onto its position in the
/// surrounding format string.
///
/// Nested tokens shift by `delta` so they land on their own text; the
/// top-level token then takes the brace-interior offset, keeping every
/// reported position in format-string coordinates.
fn reposition(mut expression: TokenExpression, start: usize, delta: usize) -> TokenExpression {
    shift_offsets(&mut expression, delta);
    match &mut expression {
        TokenExpression::Constant(t) => t.start = Some(start),
        TokenExpression::PrimitiveConstant(t) => t.start = Some(start),
        TokenExpression::Shorthand(t) => t.start = Some(start),
        TokenExpression::FormatShorthand(t) => t.start = Some(start),
        TokenExpression::Function(t) => t.start = Some(start),
        TokenExpression::LegacyFunction(t) => t.start = Some(start),
        TokenExpression::Object(t) => t.start = Some(start),
        TokenExpression::Array(t) => t.start = Some(start),
    }
    expression
}

fn shift_offsets(expression: &mut TokenExpression, delta: usize) {
    let shift = |start: &mut Option<usize>| {
        if let Some(offset) = start {
            *offset += delta;
        }
    };
    match expression {
        TokenExpression::Constant(t) => shift(&mut t.start),
        TokenExpression::PrimitiveConstant(t) => shift(&mut t.start),
        TokenExpression::Shorthand(t) => shift(&mut t.start),
        TokenExpression::FormatShorthand(t) => shift(&mut t.start),
        TokenExpression::LegacyFunction(t) => shift(&mut t.start),
        TokenExpression::Function(t) => {
            shift(&mut t.start);
            for argument in &mut t.arguments {
                shift_offsets(argument, delta);
            }
        }
        TokenExpression::Object(t) => {
            shift(&mut t.start);
            for member in t.members.values_mut() {
                shift_offsets(member, delta);
            }
        }
        TokenExpression::Array(t) => {
            shift(&mut t.start);
            for item in &mut t.items {
                shift_offsets(item, delta);
            }
        }
    }
}
