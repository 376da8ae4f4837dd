//! In-memory store used as a test double and for offline experiments.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::document::{Document, FieldUpdate, UpdateSet};
use crate::errors::MigrateError;
use crate::paths;
use crate::store::DocumentStore;

/// A `DocumentStore` holding everything in process memory.
///
/// Cloning takes a full snapshot, which tests use to assert that a dry run
/// leaves persisted state untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    collections: BTreeMap<String, BTreeMap<String, Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    pub fn insert(&mut self, collection: &str, doc: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id, doc.fields);
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<&Map<String, Value>> {
        self.collections.get(collection)?.get(id)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, BTreeMap::len)
    }
}

impl DocumentStore for MemoryStore {
    async fn scan_documents(&mut self, collection: &str) -> Result<Vec<Document>, MigrateError> {
        Ok(self
            .collections
            .get(collection)
            .into_iter()
            .flat_map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            })
            .collect())
    }

    async fn apply_updates(
        &mut self,
        collection: &str,
        id: &str,
        updates: &UpdateSet,
    ) -> Result<(), MigrateError> {
        let fields = self
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| MigrateError::DocumentNotFound { id: id.to_string() })?;

        for (path, update) in updates {
            match update {
                FieldUpdate::Set(value) => paths::set_path(fields, path, value.clone())?,
                FieldUpdate::Delete => {
                    paths::remove_path(fields, path);
                }
            }
        }
        Ok(())
    }
}
