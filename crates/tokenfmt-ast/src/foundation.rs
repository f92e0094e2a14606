//! Foundation types shared across the compiler and evaluators.
//!
//! # Design
//!
//! - `Severity` — diagnostic severity (warning or error)
//! - `ValidationIssue` — positioned diagnostic produced by structural
//!   validation, never thrown
//! - `AttributeType` / `ExpressionType` — the minimal type metadata the
//!   evaluator needs from its host to format resolved values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Code is accepted but uses a deprecated or suspicious construct.
    Warning,
    /// Structurally invalid; evaluation of the offending token will
    /// degrade to an empty segment.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Positioned diagnostic from `validate`.
///
/// Validation is structural only: issues are reported, never thrown,
/// and runtime evaluation is not blocked by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Byte offset of the offending token in the format-string source
    pub start: Option<usize>,
}

impl ValidationIssue {
    /// Creates an error-severity issue.
    pub fn error(message: impl Into<String>, start: Option<usize>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            start,
        }
    }

    /// Creates a warning-severity issue.
    pub fn warning(message: impl Into<String>, start: Option<usize>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            start,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(start) => write!(f, "{} at {}: {}", self.severity, start, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Scalar attribute type, as declared in the host schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    /// Free text
    Text,
    /// Numeric value (format specifiers such as `.2f` apply)
    Number,
    /// Boolean value
    Boolean,
}

/// Type of a dotted-path expression, as reported by a [`Scope`] or a
/// type registry.
///
/// [`Scope`]: crate::scope::Scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpressionType {
    /// Scalar attribute
    Attribute(AttributeType),
    /// Object-valued relationship to the named type
    Relationship(String),
}
