// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Lexical analysis for the JS-subset expression grammar.
//!
//! This crate tokenizes single expression fragments (function-call
//! arguments, object/array literal values, bare display expressions)
//! using logos. Whole format strings are *not* lexed here — brace
//! scanning and escape handling happen in `tokenfmt-parser`, which only
//! hands the interior expression text to this lexer.
//!
//! # Design
//!
//! - `Token` — all token types of the expression grammar
//! - String literals accept both `'...'` and `"..."` quoting (the
//!   format-string mini-language allows either inside a brace pair)
//! - Escape sequences are resolved during lexing

use logos::Logos;

/// Expression token.
///
/// Covers the fixed, small grammar the display layer needs: literals,
/// dotted member access, calls, conditional/ternary, logical and
/// arithmetic operators, object/array literals, statement punctuation
/// for the transformed `{ expr; $format = "..." }` form.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // === Literals ===
    /// Boolean literal `true`
    #[token("true")]
    True,
    /// Boolean literal `false`
    #[token("false")]
    False,
    /// Null literal
    #[token("null")]
    Null,

    /// Numeric literal (integer or float, e.g. `3`, `3.14`, `5e-2`)
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    /// String literal, double- or single-quoted.
    ///
    /// The payload is the unescaped content without quotes.
    #[regex(r#""([^"\\]|\\.)*""#, |lex| strip_and_unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| strip_and_unescape(lex.slice()))]
    Str(String),

    /// Identifier (e.g. `price`, `room`, `$format`).
    ///
    /// `$` is a valid identifier character: the format-specifier
    /// transformer introduces the synthetic `$format` binding.
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Operators ===
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `==`
    #[token("==")]
    EqEq,
    /// `!=`
    #[token("!=")]
    BangEq,
    /// `<=`
    #[token("<=")]
    LtEq,
    /// `>=`
    #[token(">=")]
    GtEq,
    /// `<`
    #[token("<")]
    Lt,
    /// `>`
    #[token(">")]
    Gt,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,

    // === Punctuation ===
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semi,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `?`
    #[token("?")]
    Question,
    /// `=`
    #[token("=")]
    Eq,
}

/// Strip surrounding quotes and resolve escape sequences.
fn strip_and_unescape(slice: &str) -> Option<String> {
    let content = &slice[1..slice.len() - 1];
    unescape(content)
}

/// Resolve `\n`, `\t`, `\r`, `\\`, `\'`, `\"` escapes.
///
/// Unknown escapes fail the token (the fragment then surfaces as a
/// lexer error to the parser, which reports it as invalid syntax).
fn unescape(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('\'') => result.push('\''),
                _ => return None,
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// Tokenize an expression fragment into `(token, byte_span)` pairs.
///
/// # Returns
///
/// `Err(offset)` with the byte offset of the first unlexable character.
pub fn tokenize(source: &str) -> Result<Vec<(Token, std::ops::Range<usize>)>, usize> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}
