//! File system session storage
//!
//! Implements SessionStorage as a single JSON object file on disk.
//! Used by native apps and the CLI, where the file outlives one process the
//! way `sessionStorage` outlives one page load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{SessionStorage, StorageError};

/// Session storage persisted to a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Create a storage backed by `path`
    ///
    /// The file and its parent directories are created on first write.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ingest_wizard::storage::filesystem::FileSessionStorage;
    ///
    /// let storage = FileSessionStorage::new("/tmp/ingest-wizard/session.json");
    /// ```
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            StorageError::IoError(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::SerializationError(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// The map a write starts from
    ///
    /// A file that no longer parses is replaced on the next write; the flag
    /// reports that the file needs rewriting even if nothing else changes.
    fn writable_map(&self) -> Result<(BTreeMap<String, String>, bool), StorageError> {
        match self.read_map() {
            Ok(map) => Ok((map, false)),
            Err(StorageError::SerializationError(e)) => {
                warn!("Discarding unreadable session file: {}", e);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(map)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        std::fs::write(&self.path, content).map_err(|e| {
            StorageError::IoError(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        debug!("Wrote {} session key(s) to {}", map.len(), self.path.display());
        Ok(())
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let (mut map, _) = self.writable_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let (mut map, corrupt) = self.writable_map()?;
        if map.remove(key).is_some() || corrupt {
            self.write_map(&map)?;
        }
        Ok(())
    }
}
