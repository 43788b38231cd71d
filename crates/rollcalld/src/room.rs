//! Persisted room configuration.
//!
//! One classroom per process: a single string value at `config/room`,
//! surviving restarts. Reads are served from an in-memory cache
//! (multi-reader); `set` is the single writer and persists before updating
//! the cache.

use rollcall_store::{Document, DocumentStore, StoreError};
use serde_json::Value;
use std::sync::{Arc, RwLock};

const ROOM_PATH: &str = "config/room";
const ROOM_FIELD: &str = "room";

pub struct RoomConfig<S> {
    store: Arc<S>,
    current: RwLock<Option<String>>,
}

impl<S: DocumentStore> RoomConfig<S> {
    /// Load the persisted room value, if any, from the store.
    pub fn load(store: Arc<S>) -> Result<Self, StoreError> {
        let current = store.get(ROOM_PATH)?.and_then(|doc| {
            doc.get(ROOM_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    /// The currently configured room, if any.
    pub fn current(&self) -> Option<String> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.current().is_some()
    }

    /// Persist a new room and update the cache. Recognition state scoped to
    /// the previous room is invalidated by the debouncer on its next
    /// observation.
    pub fn set(&self, room: &str) -> Result<(), StoreError> {
        let mut doc = Document::new();
        doc.insert(ROOM_FIELD.to_string(), Value::String(room.to_string()));
        self.store.set(ROOM_PATH, doc)?;
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(room.to_string());
        }
        tracing::info!(room, "room configured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_store::MemoryStore;

    #[test]
    fn test_unconfigured_by_default() {
        let store = Arc::new(MemoryStore::new());
        let rooms = RoomConfig::load(store).unwrap();
        assert!(!rooms.is_configured());
        assert_eq!(rooms.current(), None);
    }

    #[test]
    fn test_set_updates_cache_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let rooms = RoomConfig::load(store.clone()).unwrap();
        rooms.set("R1").unwrap();
        assert_eq!(rooms.current(), Some("R1".to_string()));

        // A fresh load (simulating a restart) sees the persisted value.
        let reloaded = RoomConfig::load(store).unwrap();
        assert_eq!(reloaded.current(), Some("R1".to_string()));
    }

    #[test]
    fn test_set_replaces_previous_room() {
        let store = Arc::new(MemoryStore::new());
        let rooms = RoomConfig::load(store).unwrap();
        rooms.set("R1").unwrap();
        rooms.set("R2").unwrap();
        assert_eq!(rooms.current(), Some("R2".to_string()));
    }
}
