//! Request and response bodies exchanged with the ingestion backend

use serde::{Deserialize, Serialize};

use super::{ConnectionConfig, DataSourceKind};

/// Body of `POST /tables`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesRequest<'a> {
    pub data_source: DataSourceKind,
    pub config: &'a ConnectionConfig,
}

/// Body of a successful `POST /tables` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesResponse {
    /// Ordered column names; empty is a valid answer
    #[serde(default)]
    pub columns: Vec<String>,
}

/// Body of `POST /ingest`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestRequest<'a> {
    pub data_source: DataSourceKind,
    pub config: &'a ConnectionConfig,
    pub columns: &'a [String],
}

/// Outcome of a successful ingestion job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub records_count: u64,
    pub message: String,
    /// ISO-8601 timestamp
    pub timestamp: String,
}
