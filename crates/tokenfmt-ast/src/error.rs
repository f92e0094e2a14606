//! Evaluation errors

use thiserror::Error;

/// Evaluation result type
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Evaluation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("legacy function token cannot be evaluated: {{{0}}}")]
    LegacyFunction(String),

    #[error("format string is not constant: {0}")]
    NotConstant(String),

    #[error("scope error evaluating '{expression}': {message}")]
    Scope {
        expression: String,
        message: String,
    },
}

impl EvalError {
    /// Creates a scope-side evaluation error.
    ///
    /// Used by `Scope` implementations to report fetch or host-function
    /// failures back through the async evaluator.
    pub fn scope(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Scope {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
