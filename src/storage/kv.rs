//! Key-value persistence interface
//!
//! The item store only needs a single slot: read a string by key, write a
//! string by key. Backends implement [`KeyValueStore`]; the store is generic
//! over it so tests can run against [`MemoryKv`] without touching disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-to-string store holding persisted slots
pub trait KeyValueStore {
    /// Reads the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Replaces the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }
}

/// In-process store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    faults: Mutex<Faults>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Faults {
    reads: bool,
    writes: bool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let kv = Self::new();
        kv.entries().insert(key.into(), value.into());
        kv
    }

    /// Makes every subsequent `get` fail until switched back
    pub fn fail_reads(&self, fail: bool) {
        self.faults().reads = fail;
    }

    /// Makes every subsequent `set` fail until switched back
    pub fn fail_writes(&self, fail: bool) {
        self.faults().writes = fail;
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        if self.faults().reads {
            return Err(KvError::Unavailable(format!("read of '{}' refused", key)));
        }
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        if self.faults().writes {
            return Err(KvError::Unavailable(format!("write to '{}' refused", key)));
        }
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Rejects keys that are empty or could escape a directory when used as a file name
pub(crate) fn check_key(key: &str) -> Result<(), KvError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(KvError::InvalidKey(key.to_string()))
    }
}
