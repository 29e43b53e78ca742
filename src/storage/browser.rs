//! Browser session storage
//!
//! Implements SessionStorage over `window.sessionStorage`.
//! Used by WASM apps; entries survive a reload but not a new tab.

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use super::{SessionStorage, StorageError};
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use web_sys::Storage;

/// Session storage backed by the tab's `sessionStorage`
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub struct BrowserSessionStorage {
    storage: Storage,
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
impl BrowserSessionStorage {
    /// Attach to the current window's `sessionStorage`
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::BackendError("Window not available".to_string()))?;

        let storage = window
            .session_storage()
            .map_err(|e| {
                StorageError::BackendError(format!("sessionStorage not available: {:?}", e))
            })?
            .ok_or_else(|| StorageError::BackendError("sessionStorage is None".to_string()))?;

        Ok(Self { storage })
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
impl SessionStorage for BrowserSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| {
            StorageError::BackendError(format!("Failed to read from sessionStorage: {:?}", e))
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Browsers raise QuotaExceededError here once the per-origin budget is spent
        self.storage.set_item(key, value).map_err(|e| {
            StorageError::QuotaExceeded(format!("Failed to write to sessionStorage: {:?}", e))
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(|e| {
            StorageError::BackendError(format!("Failed to remove from sessionStorage: {:?}", e))
        })
    }
}
