// ============================================================================
// docgraph Library
// ============================================================================

//! Schema-driven entities over a document-graph database.
//!
//! ```no_run
//! use docgraph::{EntityFactory, EntityOptions, MemoryDatabase, WriteOptions};
//! use serde_json::json;
//!
//! # async fn run() -> docgraph::Result<()> {
//! let factory = EntityFactory::new(MemoryDatabase::new().handle());
//! let users = factory.document_type(
//!     |t, _| docgraph::schema::Schema::new().field("name", t.string().required()),
//!     EntityOptions::new().name("users"),
//! );
//! users.setup().await?;
//!
//! let mut alice = users.instantiate(json!({ "name": "Alice" })).await?;
//! alice.save(WriteOptions::default()).await?;
//! assert!(alice.key().is_some());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod driver;
pub mod entity;
mod macros;
pub mod prelude;
pub mod schema;

// Re-export main types for convenience
pub use config::{EntityOptions, ModelConfig, TypeOptions};
pub use core::{DocumentHandle, EdgeEnd, EntityError, Result};
pub use driver::{
    Database, DbHandle, DocumentCollection, EdgeCollection, MemoryDatabase, StoreError,
    WriteOptions,
};
pub use entity::{
    ConstructOptions, Document, DocumentKind, DocumentType, Edge, EdgeKind, EdgeType, EndpointRef,
    Entity, EntityEvent, EntityFactory, EntityKind, EntityType, EventKind, FindOptions,
    GenericKind,
};
pub use schema::{FieldRule, Schema, Toolkit, ValidationError};

// Used by `entity_model!` expansions.
#[doc(hidden)]
pub use paste;
#[doc(hidden)]
pub use serde_json;
