// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Compilation front end for tokenfmt.
//!
//! Two entry points:
//!
//! - [`format_string::compile`] — scans a whole display-format string
//!   (`"{make} {model} ({price:.2f})"`) into a
//!   [`tokenfmt_ast::FormatString`]
//! - [`TokenExpressionParser`] — compiles a single expression fragment
//!   (a brace interior, a `$:` function expression, or any "evaluate
//!   this snippet" call site) into a [`tokenfmt_ast::TokenExpression`],
//!   with an LRU cache over compiled results
//!
//! The pipeline for a fragment: infer a [`ParseContext`], apply the
//! source transformers, lex (`tokenfmt-lexer`), parse into a generic
//! syntax tree, then dispatch each node through the conversion
//! registry.

pub mod brace;
pub mod context;
pub mod error;
pub mod format_string;
pub mod grammar;
pub mod nodes;
pub mod parser;
pub mod stream;
pub mod syntax;
pub mod transform;

pub use brace::match_brace;
pub use context::{infer_context, ParseContext};
pub use error::{ParseError, ParseErrorKind};
pub use parser::TokenExpressionParser;
