use super::{DocumentKind, EdgeKind, Entity, EntityKind, GenericKind};
use crate::config::{EntityOptions, ModelConfig, TypeOptions};
use crate::core::{Result, document_id};
use crate::driver::{DbHandle, DocumentCollection, Query, QueryCursor};
use crate::schema::{RuleValidator, Schema, SchemaValidator, Toolkit};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// Produces entity types bound to a database handle and a configuration.
#[derive(Clone)]
pub struct EntityFactory {
    db: DbHandle,
    validator: Arc<dyn SchemaValidator>,
    config: ModelConfig,
}

impl EntityFactory {
    /// Factory with default configuration and the bundled rule validator.
    pub fn new(db: DbHandle) -> Self {
        Self::with_config(db, ModelConfig::default())
    }

    pub fn with_config(db: DbHandle, config: ModelConfig) -> Self {
        Self {
            db,
            validator: Arc::new(RuleValidator::new()),
            config,
        }
    }

    /// Replace the validator used by every type created afterwards.
    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn db(&self) -> &DbHandle {
        &self.db
    }

    /// Builds an entity type.
    ///
    /// `options` are resolved over the factory defaults, then
    /// `schema_builder` runs exactly once with the rule toolkit and the
    /// resolved options.
    pub fn create_entity_type<K, F>(
        &self,
        schema_builder: F,
        options: EntityOptions,
    ) -> EntityType<K>
    where
        K: EntityKind,
        F: FnOnce(&Toolkit, &TypeOptions) -> Schema,
    {
        let options = options.resolve(&self.config, &self.db);
        let schema = schema_builder(&Toolkit, &options);
        let fields = schema.keys();

        event!(
            Level::DEBUG,
            collection = %options.name,
            fields = fields.len(),
            "entity type created"
        );

        EntityType {
            inner: Arc::new(EntityTypeInner {
                options,
                schema,
                fields,
                validator: self.validator.clone(),
                config: self.config.clone(),
            }),
            _kind: PhantomData,
        }
    }

    pub fn document_type<F>(
        &self,
        schema_builder: F,
        options: EntityOptions,
    ) -> EntityType<DocumentKind>
    where
        F: FnOnce(&Toolkit, &TypeOptions) -> Schema,
    {
        self.create_entity_type(schema_builder, options)
    }

    pub fn edge_type<F>(&self, schema_builder: F, options: EntityOptions) -> EntityType<EdgeKind>
    where
        F: FnOnce(&Toolkit, &TypeOptions) -> Schema,
    {
        self.create_entity_type(schema_builder, options)
    }
}

impl fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

struct EntityTypeInner {
    options: TypeOptions,
    schema: Schema,
    fields: Vec<String>,
    validator: Arc<dyn SchemaValidator>,
    config: ModelConfig,
}

/// Reusable blueprint: one collection, one schema, one database handle.
///
/// Cheap to clone; every clone shares the same immutable definition.
pub struct EntityType<K: EntityKind = GenericKind> {
    inner: Arc<EntityTypeInner>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> Clone for EntityType<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> fmt::Debug for EntityType<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.inner.options.name)
            .field("fields", &self.inner.fields)
            .finish()
    }
}

impl<K: EntityKind> EntityType<K> {
    /// Collection name.
    pub fn name(&self) -> &str {
        &self.inner.options.name
    }

    pub fn db(&self) -> &DbHandle {
        &self.inner.options.db
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Schema field names, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.inner.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.inner.fields.iter().any(|field| field == name)
    }

    pub fn config(&self) -> &ModelConfig {
        &self.inner.config
    }

    pub(crate) fn validator(&self) -> &dyn SchemaValidator {
        self.inner.validator.as_ref()
    }

    /// `"<collection>/<key>"`.
    pub fn id_for(&self, key: &str) -> String {
        document_id(self.name(), key)
    }

    pub fn collection(&self) -> Result<Arc<K::Collection>> {
        K::collection(self)
    }

    /// Empty instance with no data and no identity.
    pub fn skeleton(&self) -> Entity<K> {
        Entity::empty(self.clone())
    }

    /// Instance rebuilt from a stored document. Raises no events.
    pub fn hydrate(&self, data: Value) -> Result<Entity<K>> {
        let mut entity = self.skeleton();
        entity.reconcile(data)?;
        Ok(entity)
    }

    pub async fn construct(&self, data: Value, options: ConstructOptions) -> Result<Entity<K>> {
        let mut entity = self.skeleton();
        entity.merge(data, options.is_new).await?;
        Ok(entity)
    }

    /// Fresh instance from user data.
    pub async fn instantiate(&self, data: Value) -> Result<Entity<K>> {
        self.construct(data, ConstructOptions::default()).await
    }

    /// Makes sure the backing collection exists.
    ///
    /// Any failure to fetch the collection is taken as "not created yet",
    /// including connectivity or permission failures.
    pub async fn setup(&self) -> Result<()> {
        let span = info_span!("entity.setup", collection = %self.name());
        self.ensure_collection().instrument(span).await
    }

    async fn ensure_collection(&self) -> Result<()> {
        let collection = self.collection()?;
        if let Err(err) = collection.get().await {
            event!(Level::WARN, error = %err, "collection fetch failed, creating it");
            collection.create().await?;
            event!(Level::INFO, "collection created");
        }
        Ok(())
    }

    pub async fn query(&self, query: Query) -> Result<QueryCursor> {
        Ok(self.db().query(query).await?)
    }
}

/// How an instance comes to life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructOptions {
    /// New instances announce their initial merge; hydrated ones do not.
    pub is_new: bool,
}

impl Default for ConstructOptions {
    fn default() -> Self {
        Self { is_new: true }
    }
}

impl ConstructOptions {
    pub fn hydrated() -> Self {
        Self { is_new: false }
    }
}
