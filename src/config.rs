use crate::driver::{DbHandle, WriteOptions};
use std::fmt;

/// Factory-wide defaults.
///
/// Threaded into [`EntityFactory`](crate::EntityFactory) at construction and
/// captured by every entity type it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Collection name used when a type does not name one.
    pub default_name: String,

    /// Depth bound for edge traversals.
    pub traversal_max_depth: usize,

    /// Write options used by operations that take none (edge creation).
    pub write_options: WriteOptions,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_name: "generic".to_string(),
            traversal_max_depth: 10,
            write_options: WriteOptions::default(),
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback collection name
    pub fn default_name(mut self, name: &str) -> Self {
        self.default_name = name.to_string();
        self
    }

    /// Set the traversal depth bound
    pub fn traversal_max_depth(mut self, depth: usize) -> Self {
        self.traversal_max_depth = depth;
        self
    }

    /// Set default write options
    pub fn write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }
}

/// Caller-supplied overrides for one entity type.
#[derive(Clone, Default)]
pub struct EntityOptions {
    pub name: Option<String>,
    pub db: Option<DbHandle>,
}

impl EntityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collection name
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Bind the type to a database other than the factory's
    pub fn db(mut self, db: DbHandle) -> Self {
        self.db = Some(db);
        self
    }

    /// Fills every unset option from the given defaults.
    pub fn resolve(self, config: &ModelConfig, default_db: &DbHandle) -> TypeOptions {
        TypeOptions {
            name: self.name.unwrap_or_else(|| config.default_name.clone()),
            db: self.db.unwrap_or_else(|| default_db.clone()),
        }
    }
}

impl fmt::Debug for EntityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityOptions")
            .field("name", &self.name)
            .field("db", &self.db.as_ref().map(|_| "<db>"))
            .finish()
    }
}

/// Fully resolved options an entity type is bound to.
#[derive(Clone)]
pub struct TypeOptions {
    pub name: String,
    pub db: DbHandle,
}

impl fmt::Debug for TypeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeOptions")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
