//! Data source kind

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of origin the wizard is configured against
///
/// The serialized form is the raw value the backend and the durable session
/// storage understand: `"ClickHouse"` or `"Flat File"`.
///
/// # Example
///
/// ```rust
/// use ingest_wizard::models::DataSourceKind;
///
/// let kind: DataSourceKind = "Flat File".parse().unwrap();
/// assert_eq!(kind, DataSourceKind::FlatFile);
/// assert_eq!(kind.counterpart(), DataSourceKind::ClickHouse);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataSourceKind {
    /// Columnar analytics database
    #[default]
    #[serde(rename = "ClickHouse")]
    ClickHouse,
    /// Delimited flat file
    #[serde(rename = "Flat File")]
    FlatFile,
}

impl DataSourceKind {
    /// Raw value used on the wire and in session storage
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSourceKind::ClickHouse => "ClickHouse",
            DataSourceKind::FlatFile => "Flat File",
        }
    }

    /// The destination an ingestion from this kind writes to
    pub fn counterpart(&self) -> Self {
        match self {
            DataSourceKind::ClickHouse => DataSourceKind::FlatFile,
            DataSourceKind::FlatFile => DataSourceKind::ClickHouse,
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value did not name a known data source
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported data source type: {0}")]
pub struct UnknownDataSource(pub String);

impl FromStr for DataSourceKind {
    type Err = UnknownDataSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ClickHouse" => Ok(DataSourceKind::ClickHouse),
            "Flat File" => Ok(DataSourceKind::FlatFile),
            other => Err(UnknownDataSource(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clickhouse() {
        assert_eq!(DataSourceKind::default(), DataSourceKind::ClickHouse);
    }

    #[test]
    fn test_raw_values_match_serde() {
        for kind in [DataSourceKind::ClickHouse, DataSourceKind::FlatFile] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<DataSourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_raw_value() {
        let err = "Parquet".parse::<DataSourceKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported data source type: Parquet");
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(
            DataSourceKind::ClickHouse.counterpart(),
            DataSourceKind::FlatFile
        );
        assert_eq!(
            DataSourceKind::FlatFile.counterpart(),
            DataSourceKind::ClickHouse
        );
    }
}
