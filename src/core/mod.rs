pub mod error;
pub mod handle;
pub mod merge;

pub use error::{EdgeEnd, EntityError, Result};
pub use handle::{DocumentHandle, IDENTITY_FIELDS, collection_of, document_id, is_identity_field};
pub use merge::deep_merge;
