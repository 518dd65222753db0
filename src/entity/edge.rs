//! Directed edge entities.
//!
//! An edge joins two entities. Both endpoints must be set before the edge
//! can be validated or stored. A singleton edge derives its key from its
//! endpoints (`"<fromKey>-<toKey>"`), so at most one such edge exists per
//! ordered pair.

use super::{Entity, EntityKind, EntityType};
use crate::core::handle::{FROM_FIELD, KEY_FIELD, TO_FIELD, collection_of};
use crate::core::{EdgeEnd, EntityError, Result, document_id};
use crate::driver::{
    Direction, DocumentCollection, EdgeCollection, FilterDecision, TraversalOptions, VertexFilter,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// Identity of an edge endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRef {
    pub key: Option<String>,
    pub id: Option<String>,
}

impl EndpointRef {
    pub fn new(collection: &str, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            id: Some(document_id(collection, key)),
        }
    }

    /// Endpoint from a full document id such as `"users/42"`.
    pub fn from_id(id: &str) -> Self {
        let key = collection_of(id).map(|collection| id[collection.len() + 1..].to_string());
        Self {
            key,
            id: Some(id.to_string()),
        }
    }
}

impl<K: EntityKind> From<&Entity<K>> for EndpointRef {
    fn from(entity: &Entity<K>) -> Self {
        Self {
            key: entity.key().map(str::to_string),
            id: entity.id(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeState {
    from_ref: Option<EndpointRef>,
    to_ref: Option<EndpointRef>,
    is_single: bool,
}

/// Kind for entities stored in an edge collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeKind;

impl EntityKind for EdgeKind {
    type Collection = dyn EdgeCollection;
    type State = EdgeState;

    fn collection(entity_type: &EntityType<Self>) -> Result<Arc<Self::Collection>> {
        Ok(entity_type.db().edge_collection(entity_type.name()))
    }

    fn finish_payload(
        entity: &Entity<Self>,
        mut payload: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let from = entity
            .state
            .from_ref
            .as_ref()
            .ok_or(EntityError::MissingEndpoint(EdgeEnd::From))?;
        let to = entity
            .state
            .to_ref
            .as_ref()
            .ok_or(EntityError::MissingEndpoint(EdgeEnd::To))?;

        let from_id = from
            .id
            .clone()
            .ok_or(EntityError::UnresolvedEndpoint(EdgeEnd::From))?;
        let to_id = to
            .id
            .clone()
            .ok_or(EntityError::UnresolvedEndpoint(EdgeEnd::To))?;

        if entity.state.is_single {
            let from_key = from
                .key
                .as_deref()
                .ok_or(EntityError::UnresolvedEndpoint(EdgeEnd::From))?;
            let to_key = to
                .key
                .as_deref()
                .ok_or(EntityError::UnresolvedEndpoint(EdgeEnd::To))?;
            payload.insert(
                KEY_FIELD.to_string(),
                Value::String(format!("{}-{}", from_key, to_key)),
            );
        }

        payload.insert(FROM_FIELD.to_string(), Value::String(from_id));
        payload.insert(TO_FIELD.to_string(), Value::String(to_id));
        Ok(payload)
    }
}

pub type Edge = Entity<EdgeKind>;
pub type EdgeType = EntityType<EdgeKind>;

impl Entity<EdgeKind> {
    pub fn from(&mut self, endpoint: impl Into<EndpointRef>) -> &mut Self {
        self.state.from_ref = Some(endpoint.into());
        self
    }

    pub fn to(&mut self, endpoint: impl Into<EndpointRef>) -> &mut Self {
        self.state.to_ref = Some(endpoint.into());
        self
    }

    /// Key this edge by its endpoints.
    pub fn single(&mut self) -> &mut Self {
        self.state.is_single = true;
        self
    }

    pub fn is_single(&self) -> bool {
        self.state.is_single
    }

    pub fn from_ref(&self) -> Option<&EndpointRef> {
        self.state.from_ref.as_ref()
    }

    pub fn to_ref(&self) -> Option<&EndpointRef> {
        self.state.to_ref.as_ref()
    }

    /// Stores the edge. Endpoints are checked before the store is reached.
    pub async fn create(&mut self) -> Result<&mut Self> {
        let span = info_span!("edge.create", collection = %self.entity_type().name());
        self.insert_edge().instrument(span).await?;
        Ok(self)
    }

    /// Deletes the stored edge. The instance must not be reused afterwards.
    pub async fn remove(&mut self) -> Result<&mut Self> {
        let span = info_span!(
            "edge.remove",
            collection = %self.entity_type().name(),
            key = ?self.key()
        );
        self.remove_edge().instrument(span).await?;
        Ok(self)
    }

    async fn insert_edge(&mut self) -> Result<()> {
        let mut payload = self.validated_data()?;
        if let Some(key) = self.key() {
            payload
                .entry(KEY_FIELD)
                .or_insert_with(|| Value::String(key.to_string()));
        }
        let collection = self.entity_type().collection()?;
        let options = self.entity_type().config().write_options;
        let result = collection
            .save(Value::Object(payload), options)
            .await
            .inspect_err(|err| {
                event!(Level::ERROR, error = %err, "edge save failed");
            })?;
        self.absorb(result)?;
        event!(Level::DEBUG, key = ?self.key(), "edge created");
        Ok(())
    }

    async fn remove_edge(&mut self) -> Result<()> {
        let selector = self.selector()?;
        let collection = self.entity_type().collection()?;
        collection.remove(selector).await?;
        event!(Level::DEBUG, "edge removed");
        Ok(())
    }
}

impl EntityType<EdgeKind> {
    /// Walks outbound through this edge collection from `origin` and
    /// returns every reachable vertex of origin's own type, origin included,
    /// in traversal order.
    ///
    /// Vertices of other collections are left out of the result but the walk
    /// still passes through them.
    pub async fn build_deep_tree<V: EntityKind>(
        &self,
        origin: &Entity<V>,
    ) -> Result<Vec<Entity<V>>> {
        let origin_type = origin.entity_type();
        let start = origin
            .id()
            .ok_or_else(|| EntityError::MissingKey(origin_type.name().to_string()))?;
        let filter = VertexFilter::SameCollection(origin_type.name().to_string());
        let options = TraversalOptions {
            direction: Direction::Outbound,
            start_vertex: start.clone(),
            filter: filter.clone(),
            edge_collection: self.name().to_string(),
            max_depth: self.config().traversal_max_depth,
        };

        let span = info_span!(
            "edge.traversal",
            collection = %self.name(),
            start = %start,
            max_depth = options.max_depth
        );
        let collection = self.collection()?;
        let result = collection.traversal(&start, options).instrument(span).await?;
        event!(
            Level::DEBUG,
            visited = result.visited.vertices.len(),
            "traversal finished"
        );

        result
            .visited
            .vertices
            .into_iter()
            .filter(|vertex| filter.decide(vertex) == FilterDecision::Include)
            .map(|vertex| origin_type.hydrate(vertex))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_id_splits_key() {
        let endpoint = EndpointRef::from_id("users/42");
        assert_eq!(endpoint.key.as_deref(), Some("42"));
        assert_eq!(endpoint, EndpointRef::new("users", "42"));
    }
}
