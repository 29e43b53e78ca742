//! Connection configuration model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DataSourceKind;

/// Recognized configuration keys
pub mod keys {
    pub const HOST: &str = "host";
    pub const PORT: &str = "port";
    pub const DATABASE: &str = "database";
    pub const USERNAME: &str = "username";
    pub const JWT_TOKEN: &str = "jwtToken";
    pub const FILE_NAME: &str = "fileName";
    pub const DELIMITER: &str = "delimiter";
}

/// Delimiter assumed when a flat file configuration leaves it unset
pub const DEFAULT_DELIMITER: &str = ",";

const CLICKHOUSE_REQUIRED: &[&str] = &[keys::HOST, keys::PORT, keys::DATABASE];
const FLAT_FILE_REQUIRED: &[&str] = &[keys::FILE_NAME];

/// String-keyed connection settings for both data source kinds
///
/// Keys belonging to the inactive kind are retained but ignored. The JSON
/// form is a flat object, e.g. `{"host":"localhost","port":"8123"}`.
///
/// # Example
///
/// ```rust
/// use ingest_wizard::models::{ConnectionConfig, DataSourceKind};
///
/// let mut config = ConnectionConfig::new().with("host", "localhost");
/// config.merge(ConnectionConfig::new().with("port", "8123").with("database", "default"));
///
/// assert!(config.missing_required(DataSourceKind::ClickHouse).is_empty());
/// assert_eq!(config.missing_required(DataSourceKind::FlatFile), vec!["fileName"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig(BTreeMap<String, String>);

impl ConnectionConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a single key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value for `key`, including empty strings
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Value for `key` when present and non-empty
    pub fn field(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Shallow merge: keys in `partial` overwrite existing keys
    pub fn merge(&mut self, partial: ConnectionConfig) {
        self.0.extend(partial.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys required by `kind` that are absent or empty, in declaration order
    pub fn missing_required(&self, kind: DataSourceKind) -> Vec<&'static str> {
        required_keys(kind)
            .iter()
            .copied()
            .filter(|key| self.field(key).is_none())
            .collect()
    }

    /// Whether all keys required by `kind` are present
    pub fn is_complete_for(&self, kind: DataSourceKind) -> bool {
        self.missing_required(kind).is_empty()
    }

    /// Flat file delimiter, falling back to [`DEFAULT_DELIMITER`]
    pub fn delimiter(&self) -> &str {
        self.field(keys::DELIMITER).unwrap_or(DEFAULT_DELIMITER)
    }

    /// One-line human summary of the connection for `kind`
    ///
    /// The JWT token is never included.
    pub fn summary(&self, kind: DataSourceKind) -> String {
        match kind {
            DataSourceKind::ClickHouse => {
                let mut out = format!(
                    "{}:{}/{}",
                    self.get(keys::HOST).unwrap_or_default(),
                    self.get(keys::PORT).unwrap_or_default(),
                    self.get(keys::DATABASE).unwrap_or_default()
                );
                if let Some(user) = self.field(keys::USERNAME) {
                    out.push_str(&format!(" (User: {})", user));
                }
                out
            }
            DataSourceKind::FlatFile => format!(
                "{} (Delimiter: {})",
                self.get(keys::FILE_NAME).unwrap_or_default(),
                self.delimiter()
            ),
        }
    }
}

/// Keys that must be non-empty before columns can be fetched for `kind`
pub fn required_keys(kind: DataSourceKind) -> &'static [&'static str] {
    match kind {
        DataSourceKind::ClickHouse => CLICKHOUSE_REQUIRED,
        DataSourceKind::FlatFile => FLAT_FILE_REQUIRED,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConnectionConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
