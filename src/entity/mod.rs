//! Entity layer
//!
//! An [`EntityFactory`] turns a schema builder into an [`EntityType`]; the
//! type stamps out [`Entity`] instances. The kind parameter decides which
//! store operations an instance gets:
//!
//! - `GenericKind` - validation only, no collection binding
//! - `DocumentKind` - create/update/save plus lookups on the type
//! - `EdgeKind` - endpoints, singleton keys, removal and deep traversal

mod document;
mod edge;
mod events;
mod factory;
mod instance;
mod kind;

pub use document::{Document, DocumentKind, DocumentType, FindOptions};
pub use edge::{Edge, EdgeKind, EdgeState, EdgeType, EndpointRef};
pub use events::{EntityEvent, EventChannel, EventKind};
pub use factory::{ConstructOptions, EntityFactory, EntityType};
pub use instance::Entity;
pub use kind::{EntityKind, GenericKind};
