//! Durable session storage abstraction
//!
//! Defines the SessionStorage trait and implementations for different storage systems:
//! - MemorySessionStorage: In-process map (tests, headless use)
//! - FileSessionStorage: JSON file on disk (for native apps and the CLI)
//! - BrowserSessionStorage: `window.sessionStorage` (for WASM apps)

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Trait for durable string key-value stores
///
/// Mirrors the browser `Storage` interface. Calls are synchronous so a write
/// is complete by the time the caller observes the new in-memory value.
pub trait SessionStorage {
    /// Read a value, `None` when the key is absent
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is not an error
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

pub mod memory;

#[cfg(all(feature = "native-fs", not(target_arch = "wasm32")))]
pub mod filesystem;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod browser;

pub use memory::MemorySessionStorage;
