//! Token stream wrapper for the hand-written expression parser.

use crate::error::ParseError;
use std::ops::Range;
use tokenfmt_lexer::Token;

/// Token stream with lookahead and byte-offset tracking.
///
/// Each token is paired with its byte span in the (transformed)
/// expression source, so errors and fallback tokens can point back at
/// real offsets.
pub struct TokenStream<'src> {
    tokens: &'src [(Token, Range<usize>)],
    source: &'src str,
    pos: usize,
}

impl<'src> TokenStream<'src> {
    /// Creates a stream over lexed tokens and their source text.
    pub fn new(tokens: &'src [(Token, Range<usize>)], source: &'src str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token and return the consumed one.
    pub fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the expected token variant.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Expect a specific token and advance past it.
    pub fn expect(&mut self, expected: Token, description: &str) -> Result<(), ParseError> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::expected_token(
                description,
                self.peek().map(|t| format!("{t:?}")),
                self.current_offset(),
            ))
        }
    }

    /// True once every token has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Current position in the token stream (token index).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewinds to a previously saved position.
    ///
    /// Used for the object-literal/block disambiguation attempt.
    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    /// Byte offset of the current token, or end of source at EOF.
    pub fn current_offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some((_, span)) => span.start,
            None => self.source.len(),
        }
    }

    /// Byte span from a starting token index up to the last consumed
    /// token.
    pub fn span_from(&self, start: usize) -> Range<usize> {
        let start_byte = self
            .tokens
            .get(start)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source.len());
        let end_byte = if self.pos > 0 {
            self.tokens
                .get(self.pos - 1)
                .map(|(_, span)| span.end)
                .unwrap_or(start_byte)
        } else {
            start_byte
        };
        start_byte..end_byte.max(start_byte)
    }
}
