//! rollcall-store — hierarchical key-path document storage.
//!
//! The persistence boundary of the workspace: documents are JSON objects
//! addressed by slash-separated paths (`courses/C1`,
//! `courses/C1/assistances/2026-03-02`). The final path segment is the
//! document id; everything before it is the collection. Two backends ship:
//! an in-memory map for tests and ephemeral runs, and SQLite for durable
//! deployments.

pub mod memory;
pub mod sqlite;

use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A stored document: a JSON object, merged at top-level keys on update.
pub type Document = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("storage backend: {0}")]
    Backend(String),
}

/// Key-path document access.
///
/// The contract mirrors a hosted document database: `set` overwrites,
/// `update` merges at top-level keys and fails on a missing document, and
/// reads of a missing document are `Ok(None)`. No cross-document
/// transactions are offered; callers compensate with idempotent writes.
pub trait DocumentStore: Send + Sync {
    /// Read a document by full path.
    fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite a document.
    fn set(&self, path: &str, doc: Document) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document at top-level keys.
    fn update(&self, path: &str, fields: Document) -> Result<(), StoreError>;

    /// All documents of a collection as `(id, document)` pairs, ordered by
    /// id.
    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError>;

    /// Documents of `collection` whose top-level `field` equals `value`.
    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<(String, Document)>, StoreError> {
        let matches = self
            .list(collection)?
            .into_iter()
            .filter(|(_, doc)| doc.get(field).and_then(Value::as_str) == Some(value))
            .collect();
        Ok(matches)
    }
}

/// Split a path into its collection and document id.
fn split_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((collection, id)) => (collection, id),
        None => ("", path),
    }
}
