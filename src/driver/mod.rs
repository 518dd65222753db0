//! Database driver seam
//!
//! Entities never talk to a store directly; they go through these traits.
//! A driver hands out collection handles and executes queries. Edge
//! collections add traversal on top of the document primitives.
//!
//! - `types.rs` - write/lookup/traversal options and results
//! - `query.rs` - `Query` and `QueryCursor`
//! - `memory.rs` - `MemoryDatabase`, an in-process driver
//! - `error.rs` - `StoreError`

mod error;
mod memory;
mod query;
mod types;

pub use error::{StoreError, StoreResult};
pub use memory::{DriverCall, MemoryDatabase};
pub use query::{COUNT_DOCUMENTS, Query, QueryCursor};
pub use types::{
    CollectionInfo, CollectionType, Direction, DocumentSelector, ExampleOptions, FilterDecision,
    TraversalOptions, TraversalResult, VertexFilter, Visited, WriteOptions, WriteResult,
};

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Shared handle to a database, captured by entity types.
pub type DbHandle = Arc<dyn Database>;

#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches the collection descriptor; fails when it does not exist.
    async fn get(&self) -> StoreResult<CollectionInfo>;

    async fn create(&self) -> StoreResult<CollectionInfo>;

    async fn save(&self, data: Value, options: WriteOptions) -> StoreResult<WriteResult>;

    async fn update(
        &self,
        selector: DocumentSelector,
        data: Value,
        options: WriteOptions,
    ) -> StoreResult<WriteResult>;

    async fn remove(&self, selector: DocumentSelector) -> StoreResult<WriteResult>;

    /// First document whose top-level fields equal those of `example`.
    async fn first_example(&self, example: Value) -> StoreResult<Value>;

    async fn by_example(&self, example: Value, options: ExampleOptions)
    -> StoreResult<QueryCursor>;
}

#[async_trait]
pub trait EdgeCollection: DocumentCollection {
    async fn traversal(
        &self,
        start_id: &str,
        options: TraversalOptions,
    ) -> StoreResult<TraversalResult>;
}

#[async_trait]
pub trait Database: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;

    fn edge_collection(&self, name: &str) -> Arc<dyn EdgeCollection>;

    async fn query(&self, query: Query) -> StoreResult<QueryCursor>;
}
