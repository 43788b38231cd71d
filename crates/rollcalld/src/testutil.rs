//! Shared fixtures for the daemon tests.

use rollcall_store::{Document, DocumentStore, MemoryStore, StoreError};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Mutex;

pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("test document must be an object"),
    }
}

pub fn seed_course<S: DocumentStore>(store: &S, id: &str, body: Value) {
    store.set(&format!("courses/{id}"), doc(body)).unwrap();
}

pub fn seed_person<S: DocumentStore>(store: &S, id: &str, name: &str, kind: &str) {
    store
        .set(
            &format!("person/{id}"),
            doc(json!({"name": name, "kind": kind, "courses": []})),
        )
        .unwrap();
}

/// A `MemoryStore` whose writes can be made to fail per path, for
/// exercising store-unavailable handling.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_on(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn heal(&self, path: &str) {
        self.failing.lock().unwrap().remove(path);
    }

    fn check(&self, path: &str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(path) {
            return Err(StoreError::Backend("injected failure".into()));
        }
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(path)
    }

    fn set(&self, path: &str, document: Document) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.set(path, document)
    }

    fn update(&self, path: &str, fields: Document) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.update(path, fields)
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        self.inner.list(collection)
    }
}
