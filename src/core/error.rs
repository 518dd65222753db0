use crate::driver::StoreError;
use crate::schema::ValidationError;
use thiserror::Error;

/// Which end of an edge an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    From,
    To,
}

impl std::fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeEnd::From => write!(f, "from"),
            EdgeEnd::To => write!(f, "to"),
        }
    }
}

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Edge '{0}' endpoint must be set before validation")]
    MissingEndpoint(EdgeEnd),

    #[error("Edge '{0}' endpoint has no key")]
    UnresolvedEndpoint(EdgeEnd),

    #[error("Entity type '{0}' does not provide a collection; use a document or edge kind")]
    NotOverridden(String),

    #[error("Entity in '{0}' has no key")]
    MissingKey(String),

    #[error("Field '{0}' is not part of the schema of '{1}'")]
    UnknownField(String, String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Subscriber failed: {0}")]
    Subscriber(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, EntityError>;
