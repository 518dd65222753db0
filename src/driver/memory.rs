//! In-process driver
//!
//! Keeps collections in a shared map behind a `tokio::sync::Mutex`. Only the
//! primitives the entity layer relies on are implemented; `query` understands
//! nothing but [`Query::count_documents`]. Every call is journaled so callers
//! can assert which primitive an operation reached.

use super::error::{StoreError, StoreResult};
use super::query::{COUNT_DOCUMENTS, Query, QueryCursor};
use super::types::{
    CollectionInfo, CollectionType, Direction, DocumentSelector, ExampleOptions, FilterDecision,
    TraversalOptions, TraversalResult, Visited, WriteOptions, WriteResult,
};
use super::{Database, DbHandle, DocumentCollection, EdgeCollection};
use crate::core::deep_merge;
use crate::core::handle::{
    FROM_FIELD, ID_FIELD, KEY_FIELD, REV_FIELD, TO_FIELD, collection_of, document_id,
};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// A driver primitive invocation, as recorded by [`MemoryDatabase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    GetCollection(String),
    CreateCollection(String),
    Save(String),
    Update { collection: String, key: String },
    Remove { collection: String, key: String },
    FirstExample(String),
    ByExample(String),
    Traversal { collection: String, start: String },
    Query(String),
}

#[derive(Debug)]
struct StoredCollection {
    collection_type: CollectionType,
    documents: Vec<Map<String, Value>>,
}

impl StoredCollection {
    fn position(&self, key: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.get(KEY_FIELD).and_then(Value::as_str) == Some(key))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<String, StoredCollection>,
    next_key: u64,
    journal: Vec<DriverCall>,
}

impl MemoryState {
    fn stored(&self, name: &str) -> StoreResult<&StoredCollection> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn stored_mut(&mut self, name: &str) -> StoreResult<&mut StoredCollection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn vertex(&self, id: &str) -> Option<&Map<String, Value>> {
        let collection = self.collections.get(collection_of(id)?)?;
        collection
            .documents
            .iter()
            .find(|doc| doc.get(ID_FIELD).and_then(Value::as_str) == Some(id))
    }
}

/// In-memory implementation of [`Database`].
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type-erased handle suitable for an entity factory.
    pub fn handle(&self) -> DbHandle {
        Arc::new(self.clone())
    }

    /// Every driver call made so far, oldest first.
    pub async fn operations(&self) -> Vec<DriverCall> {
        self.state.lock().await.journal.clone()
    }

    pub async fn clear_operations(&self) {
        self.state.lock().await.journal.clear();
    }

    /// Snapshot of a collection's documents in insertion order.
    pub async fn documents(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let state = self.state.lock().await;
        Ok(state
            .stored(collection)?
            .documents
            .iter()
            .cloned()
            .map(Value::Object)
            .collect())
    }

    fn open(&self, name: &str, collection_type: CollectionType) -> MemoryCollection {
        MemoryCollection {
            name: name.to_string(),
            collection_type,
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(self.open(name, CollectionType::Document))
    }

    fn edge_collection(&self, name: &str) -> Arc<dyn EdgeCollection> {
        Arc::new(self.open(name, CollectionType::Edge))
    }

    async fn query(&self, query: Query) -> StoreResult<QueryCursor> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::Query(query.text.clone()));

        if query.text != COUNT_DOCUMENTS {
            return Err(StoreError::Unsupported(format!(
                "memory driver cannot execute '{}'",
                query.text
            )));
        }

        let name = query.collection_param("collection").ok_or_else(|| {
            StoreError::Unsupported("count query requires an @@collection bind".to_string())
        })?;
        let count = state.stored(name)?.documents.len();
        Ok(QueryCursor::new(vec![Value::from(count)]))
    }
}

struct MemoryCollection {
    name: String,
    collection_type: CollectionType,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCollection {
    fn info(&self, collection_type: CollectionType) -> CollectionInfo {
        CollectionInfo {
            name: self.name.clone(),
            collection_type,
        }
    }

    fn id_for(&self, key: &str) -> String {
        document_id(&self.name, key)
    }

    fn write_result(
        &self,
        doc: &Map<String, Value>,
        old_rev: Option<String>,
        options: WriteOptions,
    ) -> WriteResult {
        if options.silent {
            return WriteResult::default();
        }
        let field = |name: &str| doc.get(name).and_then(Value::as_str).map(str::to_string);
        WriteResult {
            key: field(KEY_FIELD),
            id: field(ID_FIELD),
            rev: field(REV_FIELD),
            old_rev,
            new: options.return_new.then(|| Value::Object(doc.clone())),
        }
    }

    fn check_edge(&self, stored_type: CollectionType, doc: &Map<String, Value>) -> StoreResult<()> {
        if stored_type != CollectionType::Edge {
            return Ok(());
        }
        for field in [FROM_FIELD, TO_FIELD] {
            if !doc.get(field).is_some_and(Value::is_string) {
                return Err(StoreError::InvalidEdge(format!(
                    "'{}' must be a document id",
                    field
                )));
            }
        }
        Ok(())
    }
}

fn new_revision() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("_{}", &raw[..10])
}

fn into_object(value: Value) -> StoreResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

fn matches_example(doc: &Map<String, Value>, example: &Map<String, Value>) -> bool {
    example.iter().all(|(name, value)| doc.get(name) == Some(value))
}

fn key_of(doc: &Map<String, Value>) -> Option<String> {
    match doc.get(KEY_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self) -> StoreResult<CollectionInfo> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::GetCollection(self.name.clone()));
        let stored_type = state.stored(&self.name)?.collection_type;
        Ok(self.info(stored_type))
    }

    async fn create(&self) -> StoreResult<CollectionInfo> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::CreateCollection(self.name.clone()));
        if state.collections.contains_key(&self.name) {
            return Err(StoreError::DuplicateCollection(self.name.clone()));
        }
        state.collections.insert(
            self.name.clone(),
            StoredCollection {
                collection_type: self.collection_type,
                documents: Vec::new(),
            },
        );
        Ok(self.info(self.collection_type))
    }

    async fn save(&self, data: Value, options: WriteOptions) -> StoreResult<WriteResult> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.journal.push(DriverCall::Save(self.name.clone()));

        let mut doc = into_object(data)?;
        let stored_type = state.stored(&self.name)?.collection_type;
        self.check_edge(stored_type, &doc)?;

        let stored = state.collections.get_mut(&self.name).ok_or_else(|| {
            StoreError::CollectionNotFound(self.name.clone())
        })?;
        let key = match key_of(&doc) {
            Some(key) => key,
            // Generated keys skip any key a caller already chose.
            None => loop {
                state.next_key += 1;
                let candidate = state.next_key.to_string();
                if stored.position(&candidate).is_none() {
                    break candidate;
                }
            },
        };

        if stored.position(&key).is_some() {
            return Err(StoreError::UniqueConstraint(key));
        }

        doc.insert(KEY_FIELD.to_string(), Value::String(key.clone()));
        doc.insert(ID_FIELD.to_string(), Value::String(self.id_for(&key)));
        doc.insert(REV_FIELD.to_string(), Value::String(new_revision()));
        stored.documents.push(doc.clone());

        Ok(self.write_result(&doc, None, options))
    }

    async fn update(
        &self,
        selector: DocumentSelector,
        data: Value,
        options: WriteOptions,
    ) -> StoreResult<WriteResult> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::Update {
            collection: self.name.clone(),
            key: selector.key.clone(),
        });

        let mut patch = into_object(data)?;
        for field in [KEY_FIELD, ID_FIELD, REV_FIELD] {
            patch.remove(field);
        }

        let id = self.id_for(&selector.key);
        let stored = state.stored_mut(&self.name)?;
        let stored_type = stored.collection_type;
        let index = stored
            .position(&selector.key)
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;

        let mut doc = stored.documents[index].clone();
        let old_rev = doc.get(REV_FIELD).and_then(Value::as_str).map(str::to_string);
        if let Some(expected) = &selector.rev {
            if old_rev.as_deref() != Some(expected.as_str()) {
                return Err(StoreError::Conflict(id));
            }
        }

        deep_merge(&mut doc, patch);
        self.check_edge(stored_type, &doc)?;
        doc.insert(REV_FIELD.to_string(), Value::String(new_revision()));
        stored.documents[index] = doc.clone();

        Ok(self.write_result(&doc, old_rev, options))
    }

    async fn remove(&self, selector: DocumentSelector) -> StoreResult<WriteResult> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::Remove {
            collection: self.name.clone(),
            key: selector.key.clone(),
        });

        let id = self.id_for(&selector.key);
        let stored = state.stored_mut(&self.name)?;
        let index = stored
            .position(&selector.key)
            .ok_or_else(|| StoreError::DocumentNotFound(id.clone()))?;

        if let Some(expected) = &selector.rev {
            let current = stored.documents[index].get(REV_FIELD).and_then(Value::as_str);
            if current != Some(expected.as_str()) {
                return Err(StoreError::Conflict(id));
            }
        }

        let doc = stored.documents.remove(index);
        Ok(self.write_result(&doc, None, WriteOptions::default().return_new(false)))
    }

    async fn first_example(&self, example: Value) -> StoreResult<Value> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::FirstExample(self.name.clone()));

        let example = into_object(example)?;
        state
            .stored(&self.name)?
            .documents
            .iter()
            .find(|doc| matches_example(doc, &example))
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| {
                StoreError::DocumentNotFound(format!(
                    "{} matching {}",
                    self.name,
                    Value::Object(example)
                ))
            })
    }

    async fn by_example(
        &self,
        example: Value,
        options: ExampleOptions,
    ) -> StoreResult<QueryCursor> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::ByExample(self.name.clone()));

        let example = into_object(example)?;
        let rows = state
            .stored(&self.name)?
            .documents
            .iter()
            .filter(|doc| matches_example(doc, &example))
            .skip(options.skip)
            .take(options.limit)
            .cloned()
            .map(Value::Object)
            .collect();
        Ok(QueryCursor::new(rows))
    }
}

#[async_trait]
impl EdgeCollection for MemoryCollection {
    async fn traversal(
        &self,
        start_id: &str,
        options: TraversalOptions,
    ) -> StoreResult<TraversalResult> {
        let mut state = self.state.lock().await;
        state.journal.push(DriverCall::Traversal {
            collection: options.edge_collection.clone(),
            start: start_id.to_string(),
        });

        let edges = &state.stored(&options.edge_collection)?.documents;
        if state.vertex(start_id).is_none() {
            return Err(StoreError::DocumentNotFound(start_id.to_string()));
        }

        let endpoint = |edge: &Map<String, Value>, field: &str| {
            edge.get(field).and_then(Value::as_str).map(str::to_string)
        };
        let neighbors = |id: &str| -> Vec<String> {
            edges
                .iter()
                .flat_map(|edge| {
                    let from = endpoint(edge, FROM_FIELD);
                    let to = endpoint(edge, TO_FIELD);
                    let follow_out = from.as_deref() == Some(id)
                        && matches!(options.direction, Direction::Outbound | Direction::Any);
                    let follow_in = to.as_deref() == Some(id)
                        && matches!(options.direction, Direction::Inbound | Direction::Any);

                    let mut next = Vec::new();
                    if follow_out {
                        next.extend(to);
                    }
                    if follow_in {
                        next.extend(from);
                    }
                    next
                })
                .collect()
        };

        // Breadth-first: a vertex is first reached at its shallowest depth.
        let mut vertices = Vec::new();
        let mut seen: HashSet<String> = HashSet::from([start_id.to_string()]);
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(start_id.to_string(), 0)]);

        while let Some((id, depth)) = queue.pop_front() {
            let Some(vertex) = state.vertex(&id) else {
                continue;
            };
            let vertex = Value::Object(vertex.clone());
            if options.filter.decide(&vertex) == FilterDecision::Include {
                vertices.push(vertex);
            }
            if depth >= options.max_depth {
                continue;
            }
            for next in neighbors(&id) {
                if seen.insert(next.clone()) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        Ok(TraversalResult {
            visited: Visited { vertices },
        })
    }
}
