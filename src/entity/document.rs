//! Plain document entities.

use super::{Entity, EntityKind, EntityType};
use crate::core::handle::{KEY_FIELD, REV_FIELD};
use crate::core::{EntityError, Result};
use crate::driver::{DocumentCollection, ExampleOptions, Query, StoreError, WriteOptions};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{Instrument, Level, event, info_span};

/// Kind for entities stored in a plain document collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentKind;

impl EntityKind for DocumentKind {
    type Collection = dyn DocumentCollection;
    type State = ();

    fn collection(entity_type: &EntityType<Self>) -> Result<Arc<Self::Collection>> {
        Ok(entity_type.db().collection(entity_type.name()))
    }
}

pub type Document = Entity<DocumentKind>;
pub type DocumentType = EntityType<DocumentKind>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub offset: usize,
    pub limit: usize,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

impl FindOptions {
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Entity<DocumentKind> {
    /// Stores the instance as a new document, under its key when it has one.
    pub async fn create(&mut self, options: WriteOptions) -> Result<&mut Self> {
        let span = info_span!("document.create", collection = %self.entity_type().name());
        self.insert_document(options).instrument(span).await?;
        Ok(self)
    }

    /// Writes the instance over its stored document.
    pub async fn update(&mut self, options: WriteOptions) -> Result<&mut Self> {
        let span = info_span!(
            "document.update",
            collection = %self.entity_type().name(),
            key = ?self.key()
        );
        self.update_document(options).instrument(span).await?;
        Ok(self)
    }

    /// `update` when the instance has a key, `create` otherwise.
    pub async fn save(&mut self, options: WriteOptions) -> Result<&mut Self> {
        if self.key().is_some() {
            self.update(options).await
        } else {
            self.create(options).await
        }
    }

    async fn insert_document(&mut self, options: WriteOptions) -> Result<()> {
        let collection = self.entity_type().collection()?;
        let mut payload = self.validated_data()?;
        if let Some(key) = self.key() {
            payload
                .entry(KEY_FIELD)
                .or_insert_with(|| Value::String(key.to_string()));
        }
        let result = collection
            .save(Value::Object(payload), options)
            .await
            .inspect_err(|err| {
                event!(Level::ERROR, error = %err, "document save failed");
            })?;
        self.absorb(result)?;
        event!(Level::DEBUG, key = ?self.key(), rev = ?self.revision(), "document created");
        Ok(())
    }

    async fn update_document(&mut self, options: WriteOptions) -> Result<()> {
        let selector = self.selector()?;
        let collection = self.entity_type().collection()?;
        let payload = self.validated_data()?;
        let result = collection
            .update(selector, Value::Object(payload), options)
            .await
            .inspect_err(|err| {
                event!(Level::ERROR, error = %err, "document update failed");
            })?;
        self.absorb(result)?;
        event!(Level::DEBUG, rev = ?self.revision(), "document updated");
        Ok(())
    }
}

impl EntityType<DocumentKind> {
    /// Looks a document up by key, optionally pinned to a revision.
    pub async fn find_by_id(&self, key: &str, revision: Option<&str>) -> Result<Document> {
        let mut example = Map::new();
        example.insert(KEY_FIELD.to_string(), Value::String(key.to_string()));
        if let Some(revision) = revision {
            example.insert(REV_FIELD.to_string(), Value::String(revision.to_string()));
        }
        self.find_one(Value::Object(example)).await
    }

    /// First document matching `example`. A miss fails the way the driver
    /// reports it.
    pub async fn find_one(&self, example: Value) -> Result<Document> {
        let collection = self.collection()?;
        let span = info_span!("document.find_one", collection = %self.name());
        let data = collection.first_example(example).instrument(span).await?;
        self.hydrate(data)
    }

    /// Up to `options.limit` documents matching `example`, skipping
    /// `options.offset`.
    pub async fn find(&self, example: Value, options: FindOptions) -> Result<Vec<Document>> {
        let collection = self.collection()?;
        let span = info_span!(
            "document.find",
            collection = %self.name(),
            offset = options.offset,
            limit = options.limit
        );
        let cursor = collection
            .by_example(
                example,
                ExampleOptions {
                    skip: options.offset,
                    limit: options.limit,
                },
            )
            .instrument(span)
            .await?;
        cursor
            .all()
            .into_iter()
            .map(|data| self.hydrate(data))
            .collect()
    }

    /// Number of documents in the collection.
    pub async fn count(&self) -> Result<u64> {
        let cursor = self.query(Query::count_documents(self.name())).await?;
        cursor.first().and_then(Value::as_u64).ok_or_else(|| {
            EntityError::Store(StoreError::Backend(format!(
                "count of '{}' returned no number",
                self.name()
            )))
        })
    }
}
