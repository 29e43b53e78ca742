//! Network backend
//!
//! Implements IngestBackend over the ingestion service's HTTP API:
//! - `POST {base}/tables` with `{dataSource, config}` -> `{columns}`
//! - `POST {base}/ingest` with `{dataSource, config, columns}` -> `{recordsCount, message, timestamp}`

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::{BackendError, BackendResult, IngestBackend, validate_fetch, validate_ingest};
use crate::models::{
    ConnectionConfig, DataSourceKind, IngestRequest, IngestResult, TablesRequest, TablesResponse,
};

/// Default base URL of the ingestion service
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Message reported when the request was sent but nothing came back
pub const NO_RESPONSE_MESSAGE: &str =
    "No response from server. Please check your network connection.";

/// Backend that talks to the ingestion service over HTTP
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new network backend
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API server (e.g., "http://localhost:8080/api")
    ///
    /// # Example
    ///
    /// ```rust
    /// use ingest_wizard::backend::HttpBackend;
    ///
    /// let backend = HttpBackend::new("http://localhost:8080/api");
    /// assert_eq!(backend.base_url(), "http://localhost:8080/api");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a backend that reuses an existing HTTP client
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON to `path` and decode the JSON reply
    async fn post<B, R>(&self, path: &str, body: &B) -> BackendResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = server_message(response)
                .await
                .unwrap_or_else(|| format!("Server error: {}", status.as_u16()));
            warn!("POST {} failed with {}: {}", url, status, message);
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<R>().await.map_err(|e| {
            BackendError::Unexpected(format!("Failed to parse response from {}: {}", url, e))
        })
    }
}

/// Map a failure of `send()` onto the uniform error kinds
fn transport_error(url: &str, err: reqwest::Error) -> BackendError {
    if err.is_builder() {
        warn!("Could not build request to {}: {}", url, err);
        return BackendError::Unexpected(err.to_string());
    }
    warn!("No response from {}: {}", url, err);
    BackendError::Unreachable(NO_RESPONSE_MESSAGE.to_string())
}

/// The `message` field of an error body, when the server supplied one
async fn server_message(response: reqwest::Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[async_trait(?Send)]
impl IngestBackend for HttpBackend {
    async fn fetch_columns(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
    ) -> BackendResult<TablesResponse> {
        validate_fetch(kind, config)?;
        debug!("Fetching columns for {} from {}", kind, self.base_url);

        let body = TablesRequest {
            data_source: kind,
            config,
        };
        let response: TablesResponse = self.post("/tables", &body).await?;

        info!("Loaded {} columns for {}", response.columns.len(), kind);
        Ok(response)
    }

    async fn ingest_data(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
        columns: &[String],
    ) -> BackendResult<IngestResult> {
        validate_ingest(columns)?;
        debug!("Ingesting {} column(s) from {}", columns.len(), kind);

        let body = IngestRequest {
            data_source: kind,
            config,
            columns,
        };
        let result: IngestResult = self.post("/ingest", &body).await?;

        info!("Ingested {} records from {}", result.records_count, kind);
        Ok(result)
    }
}
