//! Field schemas and validation
//!
//! - `rules.rs` - `Schema`, `FieldRule` and the `Toolkit` given to schema builders
//! - `validator.rs` - the `SchemaValidator` seam and the bundled `RuleValidator`
//! - `error.rs` - `ValidationError` with per-field violations

mod error;
mod rules;
mod validator;

pub use error::{ValidationError, ValidationResult, Violation};
pub use rules::{FieldRule, RuleKind, Schema, Toolkit};
pub use validator::{RuleValidator, SchemaValidator, ValidateOptions};
