//! Key-value storage port.
//!
//! Domain services (receipt validator, error handler, access controller)
//! never talk to a concrete store. They receive a `KeyValueStorage` handle,
//! which keeps them testable with an in-memory fake and lets the host app
//! plug in whatever persistence the platform offers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{PromptkitError, Result};

/// Storage trait for persisted app state.
///
/// Values are JSON-serialized strings; keys are opaque to the store. Each
/// operation is a single atomic read or write so callers can build
/// read-compute-write sequences without explicit locking.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`. Removing a missing key is not an
    /// error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage implementation.
///
/// Used in tests and as the fallback when the host platform offers no
/// persistence. State is lost when the process exits.
#[derive(Default)]
pub struct MemoryKeyValueStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStorage {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (for monitoring/debugging).
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStorage for MemoryKeyValueStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// File-based storage implementation (native only).
///
/// One JSON file per key under a base directory, with file-level locking
/// (fs2) so concurrent writers cannot interleave partial writes.
pub struct FileKeyValueStorage {
    base_path: PathBuf,
}

impl FileKeyValueStorage {
    /// Create a store rooted at `base_path`, creating the directory if
    /// needed.
    pub fn new(base_path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        // Keys may contain characters that are not filesystem-safe.
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            })
            .collect();
        self.base_path.join(format!("{}.json", sanitized))
    }
}

#[async_trait]
impl KeyValueStorage for FileKeyValueStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        use fs2::FileExt;

        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let file = std::fs::File::open(&path)?;
        file.lock_shared()?;
        let contents = std::fs::read_to_string(&path);
        file.unlock()?;

        Ok(Some(contents?))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        use fs2::FileExt;
        use std::io::Write;

        let path = self.key_path(key);
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        // Exclusive lock for the whole truncate-and-write sequence.
        file.lock_exclusive()?;
        let result = (|| -> std::io::Result<()> {
            let mut file = &file;
            file.set_len(0)?;
            file.write_all(value.as_bytes())?;
            file.flush()?;
            Ok(())
        })();
        file.unlock()?;

        result.map_err(|e| PromptkitError::Storage(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}
