//! In-process document store for tests and offline development

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::remote::{Document, DocumentStore};

/// Document store backed by a shared in-memory map of collections
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .expect("document store lock poisoned")
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Fetch a single document by id.
    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .lock()
            .expect("document store lock poisoned")
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
    }

    fn matches(doc: &Document, filters: &[(&str, Value)]) -> bool {
        filters
            .iter()
            .all(|(field, value)| doc.data.get(*field) == Some(value))
    }

    /// Shallow-merge `incoming` object fields over `existing`.
    fn merge(existing: &mut Value, incoming: Value) {
        match (existing.as_object_mut(), incoming) {
            (Some(target), Value::Object(source)) => {
                for (key, value) in source {
                    target.insert(key, value);
                }
            }
            (_, incoming) => *existing = incoming,
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_where(
        &self,
        collection: &str,
        filters: &[(&str, Value)],
    ) -> AppResult<Vec<Document>> {
        let collections = self
            .collections
            .lock()
            .expect("document store lock poisoned");
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| Self::matches(d, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &str, data: Value) -> AppResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self
            .collections
            .lock()
            .expect("document store lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        Ok(id)
    }

    async fn upsert_merge(&self, collection: &str, id: &str, data: Value) -> AppResult<()> {
        let mut collections = self
            .collections
            .lock()
            .expect("document store lock poisoned");
        let docs = collections.entry(collection.to_string()).or_default();

        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => Self::merge(&mut doc.data, data),
            None => docs.push(Document {
                id: id.to_string(),
                data,
            }),
        }
        Ok(())
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: Value) -> AppResult<()> {
        let mut collections = self
            .collections
            .lock()
            .expect("document store lock poisoned");
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| AppError::RemoteNotFound {
                collection: collection.to_string(),
                key: id.to_string(),
            })?;

        Self::merge(&mut doc.data, fields);
        Ok(())
    }
}
