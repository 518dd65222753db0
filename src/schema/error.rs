//! Validation error types
//!
//! A failed validation carries every violation found, each tied to the
//! dotted path of the offending field.

use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.details))]
pub struct ValidationError {
    pub details: Vec<Violation>,
}

impl ValidationError {
    pub fn new(details: Vec<Violation>) -> Self {
        Self { details }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(path, message)])
    }

    /// Paths of every violating field, in discovery order.
    pub fn paths(&self) -> Vec<&str> {
        self.details.iter().map(|v| v.path.as_str()).collect()
    }
}

fn render(details: &[Violation]) -> String {
    details
        .iter()
        .map(|v| format!("\"{}\" {}", v.path, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}
