//! Ingest Wizard - state and backend plumbing for the ingestion wizard
//!
//! Provides unified interfaces for:
//! - Cross-step session state with durable per-tab persistence
//! - Durable storage backends (memory, file system, browser `sessionStorage`)
//! - Backend access (HTTP service or in-process simulator)
//! - Step sequencing with entry guards (connection, schema, ingestion)

pub mod backend;
pub mod config;
pub mod models;
pub mod session;
pub mod storage;
pub mod wizard;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used types
pub use storage::{MemorySessionStorage, SessionStorage, StorageError};
#[cfg(all(feature = "native-fs", not(target_arch = "wasm32")))]
pub use storage::filesystem::FileSessionStorage;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub use storage::browser::BrowserSessionStorage;

pub use backend::{
    Backend, BackendError, ErrorResponse, HttpBackend, IngestBackend, SimulatedBackend,
};
pub use config::{BackendMode, ConfigError, WizardConfig};
pub use models::{ConnectionConfig, DataSourceKind, IngestResult};
pub use session::{SessionError, SessionScope, SessionState, SessionStore};
pub use wizard::{WizardController, WizardError, WizardStep};
