// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Token-expression AST and evaluation for tokenfmt.
//!
//! This crate contains the expression node variants a compiled display
//! format is made of, the runtime value model, the `Scope` capability
//! contract an evaluation target must satisfy, and the two evaluation
//! strategies (best-effort synchronous and fully asynchronous).
//!
//! Compilation from source lives in `tokenfmt-parser`; structural
//! validation and preload extraction live in `tokenfmt-resolve`.

pub mod error;
pub mod format;
pub mod format_string;
pub mod foundation;
pub mod scope;
pub mod token;
pub mod value;

// Re-export commonly used types
pub use error::{EvalError, EvalResult};
pub use format::format_value;
pub use format_string::FormatString;
pub use foundation::{AttributeType, ExpressionType, Severity, ValidationIssue};
pub use scope::{Scope, StaticObject, StaticScope};
pub use token::{
    ArrayToken, ConstantToken, FormatShorthandToken, FunctionToken, LegacyFunctionToken,
    ObjectToken, PrimitiveConstantToken, PrimitiveValue, ShorthandToken, TokenExpression,
    TERNARY_FUNCTION,
};
pub use value::{Lookup, ScopeObject, Value};
