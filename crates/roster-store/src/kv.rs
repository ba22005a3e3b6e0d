//! Key-value store backing the four roster records.
//!
//! Each record is stored as an opaque string (a JSON array in practice)
//! under a [`RecordKey`]. [`FileStore`] keeps one file per key in a data
//! directory; [`MemoryStore`] keeps everything in process and is what tests
//! inject in place of the filesystem.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::config::StoreConfig;
use crate::models::RecordKey;

/// Errors raised by a key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read record {key} from {path:?}: {source}")]
    Read {
        key: RecordKey,
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to write record {key} to {path:?}: {source}")]
    Write {
        key: RecordKey,
        path: PathBuf,
        source: io::Error,
    },

    #[error("failed to serialize record {key}: {source}")]
    Serialize {
        key: RecordKey,
        source: serde_json::Error,
    },

    #[error("store rejected write to record {0}")]
    Unavailable(RecordKey),
}

/// A synchronous string store addressed by [`RecordKey`].
///
/// Object-safe so callers can hold `&dyn KeyValueStore` or
/// `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Return the stored value, or `None` if the key has never been written
    /// (or was removed).
    fn get(&self, key: RecordKey) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: RecordKey, value: &str) -> Result<(), StoreError>;

    /// Delete the value stored under `key`. Removing a missing key is not an
    /// error.
    fn remove(&self, key: RecordKey) -> Result<(), StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn KeyValueStore) {}
};

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Stores each record as `<data_dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: RecordKey) -> Result<Option<String>, StoreError> {
        let path = self.config.record_path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { key, path, source }),
        }
    }

    fn set(&self, key: RecordKey, value: &str) -> Result<(), StoreError> {
        let path = self.config.record_path(key);
        let write_err = |source| StoreError::Write {
            key,
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(self.config.data_dir()).map_err(write_err)?;

        // Write to a sibling and rename so readers never see a torn record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;

        debug!(record = %key, path = %path.display(), bytes = value.len(), "record written");
        Ok(())
    }

    fn remove(&self, key: RecordKey) -> Result<(), StoreError> {
        let path = self.config.record_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Write { key, path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store. Writes can be switched to fail so callers can
/// exercise their persistence-error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<RecordKey, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `set` and `remove` always fail.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RecordKey, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: RecordKey) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(&key).cloned())
    }

    fn set(&self, key: RecordKey, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(key));
        }
        self.lock().insert(key, value.to_owned());
        Ok(())
    }

    fn remove(&self, key: RecordKey) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(key));
        }
        self.lock().remove(&key);
        Ok(())
    }
}
