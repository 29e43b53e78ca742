//! Backend access abstraction
//!
//! Defines the IngestBackend trait and its two implementations:
//! - HttpBackend: `POST /tables` and `POST /ingest` against a remote service
//! - SimulatedBackend: canned catalog with artificial latency (no backend needed)
//!
//! Callers hold a [`Backend`], which is exactly one of the two. Both apply
//! the same validation and report failures through [`BackendError`].

pub mod api;
pub mod simulated;

pub use api::HttpBackend;
pub use simulated::SimulatedBackend;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::connection::required_keys;
use crate::models::{ConnectionConfig, DataSourceKind, IngestResult, TablesResponse};

/// Message used by both implementations when ClickHouse fields are missing
pub const MISSING_CLICKHOUSE_PARAMS: &str = "Missing required ClickHouse connection parameters";
/// Message used by both implementations when the flat file name is missing
pub const MISSING_FILE_NAME: &str = "Missing required file name";
/// Message used by both implementations when no columns were chosen
pub const NO_COLUMNS_SELECTED: &str = "No columns selected for ingestion";

/// Error type for backend operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Required input was missing; no request was made
    #[error("{0}")]
    Validation(String),

    /// The service answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No response was received
    #[error("{0}")]
    Unreachable(String),

    /// The request could not be built or the response could not be read
    #[error("{0}")]
    Unexpected(String),
}

impl BackendError {
    /// The user-facing message, whatever the kind
    pub fn message(&self) -> &str {
        match self {
            BackendError::Validation(msg)
            | BackendError::Unreachable(msg)
            | BackendError::Unexpected(msg) => msg,
            BackendError::Rejected { message, .. } => message,
        }
    }
}

/// Uniform error shape handed to the UI layer
///
/// Serializes as `{"isError": true, "message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub is_error: bool,
    pub message: String,
}

impl From<&BackendError> for ErrorResponse {
    fn from(err: &BackendError) -> Self {
        Self {
            is_error: true,
            message: err.message().to_string(),
        }
    }
}

impl From<BackendError> for ErrorResponse {
    fn from(err: BackendError) -> Self {
        Self::from(&err)
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Trait for ingestion backends
///
/// Implementations must be interchangeable: same validation, same result
/// shapes, same error kinds for the same inputs.
#[async_trait(?Send)]
pub trait IngestBackend {
    /// List the columns available from the configured source
    async fn fetch_columns(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
    ) -> BackendResult<TablesResponse>;

    /// Run an ingestion job over `columns`
    async fn ingest_data(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
        columns: &[String],
    ) -> BackendResult<IngestResult>;
}

/// Reject a column fetch whose required connection fields are missing
pub fn validate_fetch(kind: DataSourceKind, config: &ConnectionConfig) -> BackendResult<()> {
    let missing = config.missing_required(kind);
    if missing.is_empty() {
        return Ok(());
    }

    let prefix = match kind {
        DataSourceKind::ClickHouse => MISSING_CLICKHOUSE_PARAMS,
        DataSourceKind::FlatFile => MISSING_FILE_NAME,
    };
    // Name every required key when a single one is not obvious from the prefix
    if required_keys(kind).len() > 1 {
        Err(BackendError::Validation(format!(
            "{}: {}",
            prefix,
            missing.join(", ")
        )))
    } else {
        Err(BackendError::Validation(prefix.to_string()))
    }
}

/// Reject an ingestion with no columns
pub fn validate_ingest(columns: &[String]) -> BackendResult<()> {
    if columns.is_empty() {
        return Err(BackendError::Validation(NO_COLUMNS_SELECTED.to_string()));
    }
    Ok(())
}

/// The backend a wizard talks to
///
/// Selected once at construction and swapped whole; call sites never branch
/// on which variant they hold.
#[derive(Debug, Clone)]
pub enum Backend {
    Network(HttpBackend),
    Simulated(SimulatedBackend),
}

impl Backend {
    pub fn network(base_url: impl Into<String>) -> Self {
        Backend::Network(HttpBackend::new(base_url))
    }

    pub fn simulated() -> Self {
        Backend::Simulated(SimulatedBackend::default())
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, Backend::Simulated(_))
    }

    /// Short description for status lines
    pub fn describe(&self) -> String {
        match self {
            Backend::Network(http) => format!("network backend at {}", http.base_url()),
            Backend::Simulated(_) => "simulated backend".to_string(),
        }
    }
}

impl From<HttpBackend> for Backend {
    fn from(backend: HttpBackend) -> Self {
        Backend::Network(backend)
    }
}

impl From<SimulatedBackend> for Backend {
    fn from(backend: SimulatedBackend) -> Self {
        Backend::Simulated(backend)
    }
}

#[async_trait(?Send)]
impl IngestBackend for Backend {
    async fn fetch_columns(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
    ) -> BackendResult<TablesResponse> {
        match self {
            Backend::Network(inner) => inner.fetch_columns(kind, config).await,
            Backend::Simulated(inner) => inner.fetch_columns(kind, config).await,
        }
    }

    async fn ingest_data(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
        columns: &[String],
    ) -> BackendResult<IngestResult> {
        match self {
            Backend::Network(inner) => inner.ingest_data(kind, config, columns).await,
            Backend::Simulated(inner) => inner.ingest_data(kind, config, columns).await,
        }
    }
}
