use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Collection '{0}' already exists")]
    DuplicateCollection(String),

    #[error("Document '{0}' not found")]
    DocumentNotFound(String),

    #[error("Unique constraint violated: key '{0}' already exists")]
    UniqueConstraint(String),

    #[error("Revision conflict on '{0}'")]
    Conflict(String),

    #[error("Invalid edge document: {0}")]
    InvalidEdge(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
