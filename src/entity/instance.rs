use super::events::{EntityEvent, EventChannel, EventKind};
use super::{EntityKind, EntityType, GenericKind};
use crate::core::handle::{ID_FIELD, KEY_FIELD, REV_FIELD};
use crate::core::{DocumentHandle, EntityError, Result, deep_merge, is_identity_field};
use crate::driver::{DocumentSelector, WriteResult};
use crate::schema::ValidateOptions;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Runtime entity: user data plus its document handle.
///
/// The two records never mix. Schema fields live in the data record and are
/// changed through [`merge`](Self::merge), [`reconcile`](Self::reconcile) or
/// [`set`](Self::set); `_key`, `_id`, `_rev` (and `_from`/`_to` for edges)
/// live in the handle and are changed through
/// [`add_to_handle`](Self::add_to_handle).
pub struct Entity<K: EntityKind = GenericKind> {
    entity_type: EntityType<K>,
    data: Map<String, Value>,
    handle: DocumentHandle,
    events: EventChannel,
    pub(crate) state: K::State,
}

impl<K: EntityKind> Clone for Entity<K> {
    fn clone(&self) -> Self {
        Self {
            entity_type: self.entity_type.clone(),
            data: self.data.clone(),
            handle: self.handle.clone(),
            events: self.events.clone(),
            state: self.state.clone(),
        }
    }
}

impl<K: EntityKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("collection", &self.entity_type.name())
            .field("data", &self.data)
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish()
    }
}

fn payload_object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(EntityError::InvalidPayload(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn identity_entry(field: &str, value: String) -> Map<String, Value> {
    let mut partial = Map::new();
    partial.insert(field.to_string(), Value::String(value));
    partial
}

impl<K: EntityKind> Entity<K> {
    pub(crate) fn empty(entity_type: EntityType<K>) -> Self {
        Self {
            entity_type,
            data: Map::new(),
            handle: DocumentHandle::new(),
            events: EventChannel::new(),
            state: K::State::default(),
        }
    }

    pub fn entity_type(&self) -> &EntityType<K> {
        &self.entity_type
    }

    /// Raw user-data record, unknown keys included.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Typed read of a schema field. Absent and `null` both read as `None`.
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>> {
        self.ensure_field(field)?;
        match self.data.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    /// Writes one schema field directly, without raising events.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.ensure_field(field)?;
        self.data.insert(field.to_string(), value.into());
        Ok(self)
    }

    fn ensure_field(&self, field: &str) -> Result<()> {
        if self.entity_type.has_field(field) {
            Ok(())
        } else {
            Err(EntityError::UnknownField(
                field.to_string(),
                self.entity_type.name().to_string(),
            ))
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.handle.key.as_deref()
    }

    pub fn revision(&self) -> Option<&str> {
        self.handle.rev.as_deref()
    }

    /// `"<collection>/<key>"`, or `None` while there is no key.
    pub fn id(&self) -> Option<String> {
        self.key().map(|key| self.entity_type.id_for(key))
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.add_to_handle(&identity_entry(KEY_FIELD, key.into()))
    }

    pub fn set_revision(&mut self, revision: impl Into<String>) -> &mut Self {
        self.add_to_handle(&identity_entry(REV_FIELD, revision.into()))
    }

    /// Shallow-overwrites the handle with any identity keys in `partial`.
    pub fn add_to_handle(&mut self, partial: &Map<String, Value>) -> &mut Self {
        self.handle.add(partial);
        self
    }

    /// Merges `data` into the instance.
    ///
    /// With `trigger`, `Merging` subscribers run first and all must succeed;
    /// a failure leaves the instance untouched. Identity keys go to the
    /// handle, everything else is deep-merged into the data record.
    pub async fn merge(&mut self, data: Value, trigger: bool) -> Result<&mut Self> {
        let incoming = payload_object(data)?;
        if trigger {
            self.events
                .emit(EntityEvent::Merging {
                    current: self.data.clone(),
                    incoming: incoming.clone(),
                })
                .await?;
        }
        self.apply(incoming);
        Ok(self)
    }

    /// Merge of store-provided data. Raises no events.
    pub fn reconcile(&mut self, data: Value) -> Result<&mut Self> {
        let incoming = payload_object(data)?;
        self.apply(incoming);
        Ok(self)
    }

    fn apply(&mut self, incoming: Map<String, Value>) {
        self.handle.add(&incoming);
        let user_data = incoming
            .into_iter()
            .filter(|(name, _)| !is_identity_field(name))
            .collect();
        deep_merge(&mut self.data, user_data);
    }

    /// Schema-validated copy of the data record, unknown keys stripped.
    ///
    /// Recomputed on every call.
    pub fn validated_data(&self) -> Result<Map<String, Value>> {
        let value = self.entity_type.validator().validate(
            &Value::Object(self.data.clone()),
            self.entity_type.schema(),
            ValidateOptions::strip_unknown(),
        )?;
        let payload = match value {
            Value::Object(map) => map,
            other => {
                return Err(EntityError::InvalidPayload(format!(
                    "validator returned {}",
                    other
                )));
            }
        };
        K::finish_payload(self, payload)
    }

    /// Schema fields followed by `_key`, `_id` and `_rev`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for field in self.entity_type.fields() {
            map.insert(
                field.clone(),
                self.data.get(field).cloned().unwrap_or(Value::Null),
            );
        }
        let optional = |value: Option<String>| value.map_or(Value::Null, Value::String);
        map.insert(KEY_FIELD.to_string(), optional(self.key().map(str::to_string)));
        map.insert(ID_FIELD.to_string(), optional(self.id()));
        map.insert(REV_FIELD.to_string(), optional(self.revision().map(str::to_string)));
        Value::Object(map)
    }

    pub fn on<I, F, Fut>(&mut self, kinds: I, callback: F) -> &mut Self
    where
        I: IntoIterator<Item = EventKind>,
        F: Fn(Arc<EntityEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.events.on(kinds, callback);
        self
    }

    pub async fn emit(&self, event: EntityEvent) -> Result<Vec<Value>> {
        self.events.emit(event).await
    }

    pub(crate) fn selector(&self) -> Result<DocumentSelector> {
        let key = self
            .key()
            .ok_or_else(|| EntityError::MissingKey(self.entity_type.name().to_string()))?;
        Ok(DocumentSelector::new(key).with_rev(self.revision().map(str::to_string)))
    }

    /// Folds a write result back into the instance.
    pub(crate) fn absorb(&mut self, result: WriteResult) -> Result<()> {
        self.handle.add(&result.identity());
        if let Some(new) = result.new {
            self.reconcile(new)?;
        }
        Ok(())
    }
}
