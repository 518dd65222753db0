//! Recommended imports grouped by abstraction level.
//!
//! `models` covers application code that declares entity types and works
//! with instances. `drivers` is for code that implements or inspects a store.

pub mod models {
    //! Entity types, instances and the rule toolkit.
    pub use crate::{
        ConstructOptions, Document, Edge, EndpointRef, Entity, EntityError, EntityFactory,
        EntityOptions, EntityType, EventKind, FindOptions, ModelConfig, Result, Schema,
        WriteOptions, entity_model,
    };
}

pub mod drivers {
    //! Store seam and the in-process driver.
    pub use crate::driver::{
        CollectionInfo, Database, DbHandle, DocumentCollection, DocumentSelector, DriverCall,
        EdgeCollection, MemoryDatabase, Query, QueryCursor, StoreError, StoreResult,
        TraversalOptions, TraversalResult, WriteResult,
    };
}
