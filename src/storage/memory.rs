//! In-memory session storage
//!
//! Clones share one underlying map, so a second session store built from a
//! clone sees what the first one wrote. That is how a page reload is
//! reproduced outside the browser.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{SessionStorage, StorageError};

#[derive(Debug, Default)]
struct Inner {
    entries: Mutex<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

/// Session storage held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    inner: Arc<Inner>,
}

impl MemorySessionStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail, as a corrupted or unavailable store would
    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write and removal fail, as an exhausted quota would
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of everything currently stored
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.lock().map(|map| map.clone()).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().map(|map| map.contains_key(key)).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.inner
            .entries
            .lock()
            .map_err(|e| StorageError::BackendError(format!("Storage lock poisoned: {}", e)))
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.inner.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(format!(
                "Read of '{}' refused",
                key
            )));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded(format!(
                "Write of '{}' refused",
                key
            )));
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::QuotaExceeded(format!(
                "Removal of '{}' refused",
                key
            )));
        }
        self.lock()?.remove(key);
        Ok(())
    }
}
