//! Models module for the wizard
//!
//! Defines the data structures that travel between wizard steps, the durable
//! session storage and the ingestion backend.

pub mod connection;
pub mod data_source;
pub mod ingest;

pub use connection::ConnectionConfig;
pub use data_source::{DataSourceKind, UnknownDataSource};
pub use ingest::{IngestRequest, IngestResult, TablesRequest, TablesResponse};
