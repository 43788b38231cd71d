//! SQLite-backed document store.
//!
//! One `documents` table: the full path is the primary key, the collection
//! is an indexed column for listing, the body is a JSON blob. rusqlite's
//! bundled SQLite keeps deployment to a single file.

use crate::{split_path, Document, DocumentStore, StoreError};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("create {}: {e}", parent.display())))?;
        }
        let conn = Connection::open(path).map_err(backend)?;
        tracing::info!(path = %path.display(), "opened sqlite store");
        Self::init(conn)
    }

    /// Open a private in-memory database (diagnostics and tests).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(backend)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                path       TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                body       TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_collection
                ON documents (collection);",
        )
        .map_err(backend)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".into()))
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn decode(path: &str, body: &str) -> Result<Document, StoreError> {
    serde_json::from_str(body)
        .map_err(|e| StoreError::Backend(format!("corrupt document {path}: {e}")))
}

fn encode(path: &str, doc: &Document) -> Result<String, StoreError> {
    serde_json::to_string(doc)
        .map_err(|e| StoreError::Backend(format!("encode document {path}: {e}")))
}

impl DocumentStore for SqliteStore {
    fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        body.map(|b| decode(path, &b)).transpose()
    }

    fn set(&self, path: &str, doc: Document) -> Result<(), StoreError> {
        let body = encode(path, &doc)?;
        let (collection, _) = split_path(path);
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO documents (path, collection, body) VALUES (?1, ?2, ?3)",
            params![path, collection, body],
        )
        .map_err(backend)?;
        Ok(())
    }

    fn update(&self, path: &str, fields: Document) -> Result<(), StoreError> {
        // Read-merge-write under the connection lock so concurrent updates
        // to different keys of the same document cannot lose each other.
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        let mut doc = match body {
            Some(b) => decode(path, &b)?,
            None => return Err(StoreError::NotFound(path.to_string())),
        };
        for (key, value) in fields {
            doc.insert(key, value);
        }
        let body = encode(path, &doc)?;
        conn.execute(
            "UPDATE documents SET body = ?2 WHERE path = ?1",
            params![path, body],
        )
        .map_err(backend)?;
        Ok(())
    }

    fn list(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT path, body FROM documents WHERE collection = ?1 ORDER BY path")
            .map_err(backend)?;
        let rows = stmt
            .query_map(params![collection], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(backend)?;

        let mut docs = Vec::new();
        for row in rows {
            let (path, body) = row.map_err(backend)?;
            docs.push((split_path(&path).1.to_string(), decode(&path, &body)?));
        }
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_set_get_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set("courses/C1", doc(json!({"name": "DB", "students": ["S1"]})))
            .unwrap();
        let read = store.get("courses/C1").unwrap().unwrap();
        assert_eq!(read.get("name"), Some(&json!("DB")));
        assert_eq!(read.get("students"), Some(&json!(["S1"])));
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("config/room", doc(json!({"room": "R1"}))).unwrap();
        store.set("config/room", doc(json!({"room": "R2"}))).unwrap();
        let read = store.get("config/room").unwrap().unwrap();
        assert_eq!(read.get("room"), Some(&json!("R2")));
    }

    #[test]
    fn test_update_merges_and_preserves_siblings() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .set(
                "courses/C1/assistances/2026-08-03",
                doc(json!({"S1": {"status": "absent"}, "S2": {"status": "absent"}})),
            )
            .unwrap();
        store
            .update(
                "courses/C1/assistances/2026-08-03",
                doc(json!({"S1": {"status": "present", "late": false}})),
            )
            .unwrap();

        let read = store.get("courses/C1/assistances/2026-08-03").unwrap().unwrap();
        assert_eq!(read["S1"]["status"], "present");
        assert_eq!(read["S2"]["status"], "absent");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        let err = store.update("courses/C1", Document::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_list_orders_by_id_and_scopes_collection() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("courses/C2", doc(json!({"name": "OS"}))).unwrap();
        store.set("courses/C1", doc(json!({"name": "DB"}))).unwrap();
        store
            .set("courses/C1/assistances/2026-08-03", doc(json!({})))
            .unwrap();

        let courses = store.list("courses").unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].0, "C1");
        assert_eq!(courses[1].0, "C2");
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = std::env::temp_dir().join("rollcall-store-test");
        let path = dir.join("reopen.db");
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("config/room", doc(json!({"room": "R7"}))).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        let read = store.get("config/room").unwrap().unwrap();
        assert_eq!(read.get("room"), Some(&json!("R7")));

        let _ = std::fs::remove_file(&path);
    }
}
