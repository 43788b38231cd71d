//! In-memory document store for tests and ephemeral runs.

use crate::{split_path, Document, DocumentStore, StoreError};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// `DocumentStore` backed by a process-local map. Cheap to construct per
/// test; contents vanish with the process. Iteration order is lexicographic
/// by path, matching the SQLite backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::Backend("store lock poisoned".into())
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.docs.read().map_err(poisoned)?.get(path).cloned())
    }

    fn set(&self, path: &str, doc: Document) -> Result<(), StoreError> {
        self.docs
            .write()
            .map_err(poisoned)?
            .insert(path.to_string(), doc);
        Ok(())
    }

    fn update(&self, path: &str, fields: Document) -> Result<(), StoreError> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        let doc = docs
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        for (key, value) in fields {
            doc.insert(key, value);
        }
        Ok(())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .filter(|(path, _)| split_path(path).0 == collection)
            .map(|(path, doc)| (split_path(path).1.to_string(), doc.clone()))
            .collect())
    }
}
