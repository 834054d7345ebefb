//! Durable key/value storage backends.
//!
//! This module provides the [`StorageBackend`] trait and its two
//! implementations. The [`ConfigStore`](crate::config_store::ConfigStore)
//! layers a typed, fail-soft API on top.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ConfigStore                            │
//! │   - In-memory cache of JSON values by key                     │
//! │   - Typed read/write with defaults, legacy migration          │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory, optional byte quota             │
//! │   - FileStorage: JSON file (requires file-storage)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned to the store, logged there |
//! | `StorageError::Serialization` | JSON encode/decode | Returned, store falls back |
//! | `StorageError::QuotaExceeded` | Backend size limit | Save rejected, previous data intact |
//! | `StorageError::Corruption` | Poisoned lock, bad format | Returned, store falls back |
//! | Missing file | First run | Empty entry map |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Storage content is corrupted or a lock was poisoned.
    Corruption(String),
    /// Saving would exceed the backend's size limit.
    QuotaExceeded { required: usize, limit: usize },
    /// Backend is not available (e.g., unwritable directory).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::QuotaExceeded { required, limit } => {
                write!(f, "storage quota exceeded: {required} bytes > {limit} byte limit")
            }
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(_)
            | StorageError::Corruption(_)
            | StorageError::QuotaExceeded { .. }
            | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// All stored values, keyed by record name.
pub type Entries = BTreeMap<String, Value>;

/// Approximate serialized size of an entry map in bytes.
#[must_use]
pub fn entries_size(entries: &Entries) -> usize {
    entries
        .iter()
        .map(|(key, value)| key.len() + value.to_string().len())
        .sum()
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable durable storage.
///
/// # Implementation Notes
///
/// - `load_all` returns an empty map on first run.
/// - `save_all` replaces all stored entries and must be all-or-nothing: on
///   error the previously stored entries remain readable.
pub trait StorageBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Load all stored entries.
    fn load_all(&self) -> StorageResult<Entries>;

    /// Replace all stored entries.
    fn save_all(&self, entries: &Entries) -> StorageResult<()>;

    /// Remove all stored entries.
    fn clear(&self) -> StorageResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend.
///
/// State is lost when the process exits. An optional byte quota emulates the
/// size limit of browser local storage so quota failures can be exercised.
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<Entries>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: Entries) -> Self {
        Self {
            data: RwLock::new(entries),
            quota: None,
        }
    }

    /// Reject saves whose total size exceeds `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Current stored value for `key` (diagnostics and tests).
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.data.read().ok()?.get(key).cloned()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn load_all(&self) -> StorageResult<Entries> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn save_all(&self, entries: &Entries) -> StorageResult<()> {
        if let Some(limit) = self.quota {
            let required = entries_size(entries);
            if required > limit {
                return Err(StorageError::QuotaExceeded { required, limit });
            }
        }
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        *guard = entries.clone();
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.data.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStorage")
            .field("entries", &count)
            .field("quota", &self.quota)
            .finish()
    }
}

// Shared handles let a test or host keep inspecting a backend after handing
// it to a store.
impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn load_all(&self) -> StorageResult<Entries> {
        (**self).load_all()
    }

    fn save_all(&self, entries: &Entries) -> StorageResult<()> {
        (**self).save_all(entries)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires file-storage feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-storage")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk layout.
    #[derive(Serialize, Deserialize)]
    struct StateFile {
        /// Format version for future migrations.
        format_version: u32,
        entries: Entries,
    }

    impl StateFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// File-based storage backend using JSON.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "widget_order": ["quote", "tasks"],
    ///     "widget_sizes": { "tasks": 2 }
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first save.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Storage at `$XDG_STATE_HOME/tilepage/{app_name}/state.json`
        /// (falling back to `~/.local/state`, then the current directory).
        #[must_use]
        pub fn default_for_app(app_name: &str) -> Self {
            let base = state_dir_or_fallback();
            let path = base.join("tilepage").join(app_name).join("state.json");
            Self { path }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }
    }

    fn state_dir_or_fallback() -> PathBuf {
        if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
            return PathBuf::from(state_home);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".local").join("state");
        }
        PathBuf::from(".")
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn load_all(&self) -> StorageResult<Entries> {
            if !self.path.exists() {
                return Ok(Entries::new());
            }

            let file = File::open(&self.path)?;
            let reader = BufReader::new(file);
            let state_file: StateFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse state file: {e}"))
            })?;

            if state_file.format_version != StateFile::FORMAT_VERSION {
                tracing::warn!(
                    stored = state_file.format_version,
                    expected = StateFile::FORMAT_VERSION,
                    "state file format version mismatch, ignoring stored state"
                );
                return Ok(Entries::new());
            }

            Ok(state_file.entries)
        }

        fn save_all(&self, entries: &Entries) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let state_file = StateFile {
                format_version: StateFile::FORMAT_VERSION,
                entries: entries.clone(),
            };

            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &state_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize state: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }

            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = entries.len(),
                "saved layout state"
            );
            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            let Some(parent) = self.path.parent() else {
                return false;
            };
            if !parent.exists() {
                return fs::create_dir_all(parent).is_ok();
            }
            let probe = parent.join(".tilepage_write_probe");
            if fs::write(&probe, b"probe").is_ok() {
                let _ = fs::remove_file(&probe);
                return true;
            }
            false
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────


#[cfg(all(test, feature = "file-storage"))]
mod file_storage_tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn file_storage_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let storage = FileStorage::new(&path);

        let mut e = Entries::new();
        e.insert("widget_order".into(), json!(["quote", "tasks"]));
        e.insert("widget_sizes".into(), json!({"tasks": 2}));
        storage.save_all(&e).unwrap();
        assert!(path.exists());

        let loaded = storage.load_all().unwrap();
        assert_eq!(loaded, e);
    }

    #[test]
    fn file_storage_load_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("does_not_exist.json"));
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_clear() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, "{}").unwrap();

        let storage = FileStorage::new(&path);
        storage.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn file_storage_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dirs").join("state.json");
        let storage = FileStorage::new(&path);
        storage.save_all(&Entries::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_storage_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "not json at all").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.load_all(),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn file_storage_ignores_future_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"format_version":9,"entries":{"widget_order":["tasks"]}}"#,
        )
        .unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.load_all().unwrap().is_empty());
    }

    #[test]
    fn file_storage_available_in_tempdir() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("sub").join("state.json"));
        assert!(storage.is_available());
    }
}
