use super::{Entity, EntityType};
use crate::core::{EntityError, Result};
use crate::driver::DocumentCollection;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Type-level flavour of an entity: which collection kind it lives in and
/// what extra per-instance state it carries.
pub trait EntityKind: Sized + Send + Sync + 'static {
    type Collection: DocumentCollection + ?Sized;
    type State: Default + Clone + fmt::Debug + Send + Sync;

    /// Collection handle for the given type.
    fn collection(entity_type: &EntityType<Self>) -> Result<Arc<Self::Collection>>;

    /// Last step of `validated_data`, after schema validation succeeded.
    fn finish_payload(
        _entity: &Entity<Self>,
        payload: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        Ok(payload)
    }
}

/// Base kind with no collection binding.
///
/// Useful for validation-only models; any store operation fails with
/// [`EntityError::NotOverridden`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericKind;

impl EntityKind for GenericKind {
    type Collection = dyn DocumentCollection;
    type State = ();

    fn collection(entity_type: &EntityType<Self>) -> Result<Arc<Self::Collection>> {
        Err(EntityError::NotOverridden(entity_type.name().to_string()))
    }
}
