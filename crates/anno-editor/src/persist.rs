//! Persistence gateway: the canvas-state aggregate in a durable KV store.
//!
//! The store trait models an origin-scoped key-value store (browser
//! `localStorage` in the real embedding; `MemoryStore` in tests and
//! native hosts). The gateway serializes the aggregate as a single JSON
//! document and recovers locally from every persistence failure: a
//! corrupt snapshot loads as `None`, a failed write is logged and never
//! interrupts editing. Debouncing is the orchestrator's job — the
//! gateway itself performs no batching.

use anno_core::model::CanvasState;
use anno_core::snapshot;
use std::collections::HashMap;
use thiserror::Error;

/// Key under which the document snapshot is stored.
pub const SNAPSHOT_KEY: &str = "annotate.document";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the write (quota, I/O, ...).
    #[error("storage backend: {0}")]
    Backend(String),
}

/// A durable string-keyed store scoped to one origin.
pub trait SnapshotStore {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn delete(&mut self, key: &str);
}

/// In-memory store for tests and native embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Serializes/deserializes the full editable state, gated by an enable
/// flag (the autosave toggle).
pub struct PersistenceGateway {
    store: Box<dyn SnapshotStore>,
    enabled: bool,
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            store,
            enabled: true,
        }
    }

    /// Serialize and overwrite the stored snapshot. A no-op while
    /// disabled; failures are logged and swallowed.
    pub fn save(&mut self, state: &CanvasState) {
        if !self.enabled {
            return;
        }
        let json = match snapshot::encode(state) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("snapshot encode failed: {err}");
                return;
            }
        };
        if let Err(err) = self.store.write(SNAPSHOT_KEY, &json) {
            log::warn!("snapshot write failed: {err}");
        }
    }

    /// Load the stored aggregate. `None` when nothing is stored or the
    /// snapshot is unreadable — never fatal.
    pub fn load(&self) -> Option<CanvasState> {
        let json = self.store.read(SNAPSHOT_KEY)?;
        snapshot::decode(&json)
    }

    /// Remove the stored snapshot.
    pub fn clear(&mut self) {
        self.store.delete(SNAPSHOT_KEY);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anno_core::id::LayerId;
    use anno_core::model::Layer;
    use pretty_assertions::assert_eq;

    fn state_with_layer(name: &str) -> CanvasState {
        CanvasState {
            layers: vec![Layer::new_text(LayerId::intern(name), 1)],
            canvas_width: 640,
            canvas_height: 480,
            original_width: 640,
            original_height: 480,
            ..Default::default()
        }
    }

    #[test]
    fn save_load_roundtrip() {
        let mut gateway = PersistenceGateway::new(Box::new(MemoryStore::new()));
        let state = state_with_layer("pg_a");

        gateway.save(&state);
        assert_eq!(gateway.load(), Some(state));
    }

    #[test]
    fn disabled_gateway_skips_save() {
        let mut gateway = PersistenceGateway::new(Box::new(MemoryStore::new()));
        gateway.set_enabled(false);

        gateway.save(&state_with_layer("pg_b"));
        assert_eq!(gateway.load(), None);
    }

    #[test]
    fn corrupt_snapshot_loads_as_none() {
        let mut store = MemoryStore::new();
        store.write(SNAPSHOT_KEY, "{definitely not json").unwrap();

        let gateway = PersistenceGateway::new(Box::new(store));
        assert_eq!(gateway.load(), None);
    }

    #[test]
    fn clear_removes_snapshot() {
        let mut gateway = PersistenceGateway::new(Box::new(MemoryStore::new()));
        gateway.save(&state_with_layer("pg_c"));
        gateway.clear();
        assert_eq!(gateway.load(), None);
    }

    #[test]
    fn save_overwrites_prior_snapshot() {
        let mut gateway = PersistenceGateway::new(Box::new(MemoryStore::new()));
        gateway.save(&state_with_layer("pg_d"));

        let mut newer = state_with_layer("pg_e");
        newer.canvas_width = 1024;
        gateway.save(&newer);

        assert_eq!(gateway.load(), Some(newer));
    }
}
