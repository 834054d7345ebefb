#![forbid(unsafe_code)]

//! Typed, fail-soft key/value store over a [`StorageBackend`].
//!
//! The store keeps an in-memory cache of every record. Reads are served from
//! the cache; writes update the cache first and then flush the whole map to
//! the backend. A failed flush is logged and leaves the cache authoritative,
//! so callers never observe storage errors.
//!
//! On [`open`](ConfigStore::open) the store loads the backend and runs the
//! legacy `enabled_widgets` migration exactly once.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::migration::{self, MigrationOutcome};
use crate::state_persistence::{
    Entries, MemoryStorage, StorageBackend, StorageResult, entries_size,
};

/// Diagnostics snapshot of a [`ConfigStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of cached records.
    pub entry_count: usize,
    /// Approximate serialized size of all records.
    pub total_bytes: usize,
    /// Whether the cache holds changes the backend has not accepted.
    pub dirty: bool,
    /// Backend name.
    pub backend: String,
}

/// Durable configuration store.
pub struct ConfigStore {
    backend: Box<dyn StorageBackend>,
    cache: Entries,
    dirty: bool,
    migration: Option<MigrationOutcome>,
}

impl ConfigStore {
    /// Open a store over `backend`, load its records and migrate legacy data.
    ///
    /// A backend that cannot be read yields an empty store; the failure is
    /// logged.
    #[must_use]
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        let cache = match backend.load_all() {
            Ok(entries) => {
                tracing::debug!(
                    backend = %backend.name(),
                    count = entries.len(),
                    "loaded layout state"
                );
                entries
            }
            Err(e) => {
                tracing::warn!(
                    backend = %backend.name(),
                    error = %e,
                    "failed to load layout state, starting from defaults"
                );
                Entries::new()
            }
        };

        let mut store = Self {
            backend,
            cache,
            dirty: false,
            migration: None,
        };
        let outcome = migration::migrate_legacy_enabled_widgets(&mut store);
        tracing::debug!(outcome = ?outcome, "legacy migration finished");
        store
    }

    /// Store over fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStorage::new()))
    }

    /// Read and decode `key`, or return `default` when absent or malformed.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.cache.get(key) else {
            return default;
        };
        match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored value malformed, using default");
                default
            }
        }
    }

    /// Raw cached JSON for `key`.
    #[must_use]
    pub fn read_value(&self, key: &str) -> Option<&Value> {
        self.cache.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Encode and store `value` under `key`.
    ///
    /// Returns `true` when the backend accepted the write. On `false` the
    /// value is either unencodable (cache untouched) or cached but not yet
    /// durable; the next successful flush carries it.
    pub fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode value, write skipped");
                return false;
            }
        };
        self.cache.insert(key.to_string(), encoded);
        self.dirty = true;
        self.flush_logged(key)
    }

    /// Delete `key`. Returns `true` when it existed and the backend accepted
    /// the removal.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.cache.remove(key).is_none() {
            return false;
        }
        self.dirty = true;
        self.flush_logged(key)
    }

    /// Write the cache to the backend if anything changed.
    ///
    /// Returns `Ok(true)` if data was written, `Ok(false)` if clean.
    pub fn flush(&mut self) -> StorageResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.backend.save_all(&self.cache)?;
        self.dirty = false;
        Ok(true)
    }

    fn flush_logged(&mut self, key: &str) -> bool {
        match self.flush() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    backend = %self.backend.name(),
                    error = %e,
                    "failed to persist layout state, keeping in-memory copy"
                );
                false
            }
        }
    }

    /// Cached record names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.cache.keys().map(String::as_str)
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entry_count: self.cache.len(),
            total_bytes: entries_size(&self.cache),
            dirty: self.dirty,
            backend: self.backend.name().to_string(),
        }
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Result of the legacy migration run at open.
    #[must_use]
    pub fn migration_outcome(&self) -> Option<&MigrationOutcome> {
        self.migration.as_ref()
    }

    pub(crate) fn record_migration(&mut self, outcome: MigrationOutcome) {
        self.migration = Some(outcome);
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("backend", &self.backend.name())
            .field("entries", &self.cache.len())
            .field("dirty", &self.dirty)
            .field("migration", &self.migration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    use crate::state_persistence::StorageError;

    /// Backend whose loads and saves always fail.
    struct BrokenStorage;

    impl StorageBackend for BrokenStorage {
        fn name(&self) -> &str {
            "BrokenStorage"
        }

        fn load_all(&self) -> StorageResult<Entries> {
            Err(StorageError::Corruption("unreadable".into()))
        }

        fn save_all(&self, _entries: &Entries) -> StorageResult<()> {
            Err(StorageError::Unavailable("read-only".into()))
        }

        fn clear(&self) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn read_absent_returns_default() {
        let store = ConfigStore::in_memory();
        assert_eq!(store.read("missing", 7u8), 7);
    }

    #[test]
    fn read_malformed_returns_default() {
        let mut entries = Entries::new();
        entries.insert("widget_order".into(), json!({"not": "an array"}));
        let store = ConfigStore::open(Box::new(MemoryStorage::with_entries(entries)));
        let order: Vec<String> = store.read("widget_order", vec!["fallback".into()]);
        assert_eq!(order, vec!["fallback".to_string()]);
    }

    #[test]
    fn write_then_read() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = ConfigStore::open(Box::new(Arc::clone(&backend)));
        assert!(store.write("widget_order", &["tasks", "notes"]));
        assert!(!store.is_dirty());

        let order: Vec<String> = store.read("widget_order", Vec::new());
        assert_eq!(order, vec!["tasks".to_string(), "notes".to_string()]);
        assert_eq!(backend.peek("widget_order"), Some(json!(["tasks", "notes"])));
    }

    #[test]
    fn failed_write_keeps_cache() {
        let mut store = ConfigStore::open(Box::new(BrokenStorage));
        assert!(!store.write("widget_order", &["tasks"]));
        assert!(store.is_dirty());
        let order: Vec<String> = store.read("widget_order", Vec::new());
        assert_eq!(order, vec!["tasks".to_string()]);
    }

    #[test]
    fn broken_load_starts_empty() {
        let store = ConfigStore::open(Box::new(BrokenStorage));
        assert_eq!(store.stats().entry_count, 0);
        assert_eq!(store.backend_name(), "BrokenStorage");
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut store = ConfigStore::in_memory();
        assert!(!store.remove("nothing"));
        assert!(!store.is_dirty());
    }

    #[test]
    fn remove_persists() {
        let backend = Arc::new(MemoryStorage::new());
        let mut store = ConfigStore::open(Box::new(Arc::clone(&backend)));
        store.write("a", &1);
        assert!(store.remove("a"));
        assert!(!store.contains("a"));
        assert_eq!(backend.peek("a"), None);
    }

    #[test]
    fn stats_and_keys() {
        let mut store = ConfigStore::in_memory();
        store.write("b", &2);
        store.write("a", &1);
        let keys: Vec<&str> = store.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);

        let stats = store.stats();
        assert_eq!(stats.entry_count, 2);
        assert_eq!(stats.total_bytes, 4);
        assert!(!stats.dirty);
        assert_eq!(stats.backend, "MemoryStorage");
    }

    #[test]
    fn flush_when_clean_is_noop() {
        let mut store = ConfigStore::in_memory();
        assert!(!store.flush().unwrap());
    }

    #[test]
    fn migration_recorded_on_open() {
        let store = ConfigStore::in_memory();
        assert_eq!(store.migration_outcome(), Some(&MigrationOutcome::NoLegacyData));
    }
}
