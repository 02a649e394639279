//! Durable key/value store backed by a single JSON document.
//!
//! The whole document is loaded once when the store is opened and rewritten
//! atomically (tmp file + fsync + rename) on every mutation.

use playground_core::error::{PlaygroundError, Result};
use playground_core::storage::KeyValueStore;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

type Entries = BTreeMap<String, String>;

/// A `KeyValueStore` persisted as one JSON object on disk.
///
/// Provides:
/// - **Atomicity**: each write is all-or-nothing via tmp file + atomic rename
/// - **Durability**: explicit fsync before rename
/// - **Capacity**: an optional byte limit on the serialized document; writes
///   that would exceed it are rejected and leave memory and disk unchanged
///
/// There is no cross-process locking: the last writer wins.
pub struct JsonFileStore {
    path: PathBuf,
    capacity_bytes: Option<usize>,
    entries: Mutex<Entries>,
}

impl JsonFileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. A corrupt file is logged and also
    /// treated as empty; it is overwritten by the next successful write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable store file");
                Entries::new()
            }
        };

        Self {
            path,
            capacity_bytes: None,
            entries: Mutex::new(entries),
        }
    }

    /// Limits the serialized size of the document.
    pub fn with_capacity_bytes(mut self, capacity_bytes: Option<usize>) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Entries> {
        if !path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Applies `mutate` to a copy of the entries and commits it only if the
    /// copy fits the capacity and reaches disk.
    fn commit<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Entries),
    {
        let mut entries = self.lock();
        let mut next = entries.clone();
        mutate(&mut next);

        let serialized = serde_json::to_string(&next)?;
        if let Some(capacity) = self.capacity_bytes {
            if serialized.len() > capacity {
                return Err(PlaygroundError::storage(format!(
                    "quota exceeded: {} bytes > {} bytes",
                    serialized.len(),
                    capacity
                )));
            }
        }

        self.write_atomically(&serialized)?;
        *entries = next;
        Ok(())
    }

    fn write_atomically(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| PlaygroundError::io("store path has no file name"))?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.lock().contains_key(key) {
            return Ok(());
        }
        self.commit(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<()> {
        self.commit(|entries| entries.clear())
    }
}
