//! # tokenfmt
//!
//! Token-expression compiler and dual-mode evaluator for display-format
//! strings like `"{make} {model} ({price:.2f})"`.
//!
//! This crate is a facade that re-exports functionality from:
//! - `tokenfmt-ast` - token-expression AST, value model, scopes,
//!   evaluation
//! - `tokenfmt-lexer` - expression tokenization
//! - `tokenfmt-parser` - format-string tokenizer and JS-subset
//!   expression parser
//! - `tokenfmt-resolve` - type-graph validation and preload extraction
//!
//! ## Architecture
//!
//! ```text
//! tokenfmt-ast              - token variants + Scope contract + evaluators
//!     ↓
//! tokenfmt-lexer            - logos lexer for the expression subset
//!     ↓
//! tokenfmt-parser           - tokenizer, grammar, transforms, LRU cache
//!     ↓
//! tokenfmt-resolve          - validation + preload planning
//!     ↓
//! tokenfmt (facade)         - re-exports + compile API
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tokenfmt::{compile, TokenExpressionParser};
//!
//! let parser = TokenExpressionParser::new();
//! let format = compile("{room.name} ({room.building.name})", &parser)?;
//! let label = format.evaluate_future(&scope).await?;
//! ```

// Re-export AST, values, scopes and evaluation
pub use tokenfmt_ast::{self as ast, *};

// Re-export lexer
pub use tokenfmt_lexer as lexer;
pub use tokenfmt_lexer::Token;

// Re-export parser
pub use tokenfmt_parser as parser;
pub use tokenfmt_parser::{
    infer_context, match_brace, ParseContext, ParseError, ParseErrorKind, TokenExpressionParser,
};

// Re-export resolve
pub use tokenfmt_resolve as resolve;
pub use tokenfmt_resolve::{
    extract, validate, Member, PreloadTree, TypeDescriptor, TypeRegistry, MAX_PRELOAD_DEPTH,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compiles a display-format string into its token sequence.
///
/// Convenience wrapper over [`parser::format_string::compile`]; the
/// supplied parser's LRU cache is shared across calls.
pub fn compile(source: &str, parser: &TokenExpressionParser) -> Result<FormatString, ParseError> {
    tokenfmt_parser::format_string::compile(source, parser)
}
