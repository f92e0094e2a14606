//! Parse error types.
//!
//! Errors here are *fatal for the parse call* and only arise from the
//! JS-subset expression grammar. Malformed format-string syntax
//! (unmatched braces or quotes) is never an error: it degrades to
//! literal constant text in the tokenizer.

use std::fmt;

/// Parse error with source offset and context.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// Kind of parse error
    pub kind: ParseErrorKind,
    /// Byte offset into the expression fragment where the error
    /// occurred
    pub offset: usize,
    /// Human-readable error message
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Unexpected token where a specific token was expected.
    UnexpectedToken,

    /// Unexpected end of input while a construct was incomplete.
    UnexpectedEof,

    /// Tokens are present but violate the expression grammar.
    InvalidSyntax,

    /// A syntax-tree node kind with no registered parser.
    ///
    /// Indicates the grammar produced a construct the dispatch registry
    /// does not know; not recoverable for this parse.
    UnsupportedNode,
}

impl ParseError {
    /// Creates an "expected token" error.
    pub fn expected_token(expected: &str, found: Option<String>, offset: usize) -> Self {
        let (kind, message) = match found {
            Some(found) => (
                ParseErrorKind::UnexpectedToken,
                format!("expected {expected}, found {found}"),
            ),
            None => (
                ParseErrorKind::UnexpectedEof,
                format!("expected {expected}, found end of input"),
            ),
        };
        Self {
            kind,
            offset,
            message,
        }
    }

    /// Creates an "unexpected token" error.
    pub fn unexpected_token(found: Option<String>, context: &str, offset: usize) -> Self {
        let (kind, message) = match found {
            Some(found) => (
                ParseErrorKind::UnexpectedToken,
                format!("unexpected {found} {context}"),
            ),
            None => (
                ParseErrorKind::UnexpectedEof,
                format!("unexpected end of input {context}"),
            ),
        };
        Self {
            kind,
            offset,
            message,
        }
    }

    /// Creates an "invalid syntax" error.
    pub fn invalid_syntax(message: impl Into<String>, offset: usize) -> Self {
        Self {
            kind: ParseErrorKind::InvalidSyntax,
            offset,
            message: message.into(),
        }
    }

    /// Creates an error for a node kind with no registered parser.
    pub fn unsupported_node(kind_name: &str, offset: usize) -> Self {
        Self {
            kind: ParseErrorKind::UnsupportedNode,
            offset,
            message: format!("no parser registered for node type {kind_name}"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}
