//! Simulated backend
//!
//! Answers from a small fixed catalog after an artificial delay, so the
//! whole wizard can be exercised without a running ingestion service.
//! Database names outside the catalog list no columns instead of failing,
//! which keeps the "no columns found" path reachable.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use tracing::debug;

use super::{BackendResult, IngestBackend, validate_fetch, validate_ingest};
use crate::models::connection::keys;
use crate::models::{ConnectionConfig, DataSourceKind, IngestResult, TablesResponse};

/// Delay before a column listing resolves
pub const DEFAULT_COLUMNS_DELAY: Duration = Duration::from_millis(800);
/// Delay before an ingestion resolves
pub const DEFAULT_INGEST_DELAY: Duration = Duration::from_millis(2000);

/// Range the simulated record count is drawn from
pub const RECORDS_RANGE: std::ops::Range<u64> = 1000..11000;

/// Databases known to the simulator, each with its tables in listing order
const CLICKHOUSE_CATALOG: &[(&str, &[(&str, &[&str])])] = &[
    (
        "default",
        &[
            (
                "uk_price_paid",
                &[
                    "price", "date", "postcode1", "postcode2", "type", "is_new", "duration",
                    "addr1", "addr2", "street", "locality", "town", "district", "county",
                ],
            ),
            (
                "ontime",
                &[
                    "Year",
                    "Quarter",
                    "Month",
                    "DayofMonth",
                    "DayOfWeek",
                    "FlightDate",
                    "UniqueCarrier",
                    "AirlineID",
                    "Carrier",
                    "TailNum",
                    "FlightNum",
                    "OriginAirportID",
                    "OriginAirportSeqID",
                    "OriginCityMarketID",
                    "Origin",
                    "DestAirportID",
                    "DestAirportSeqID",
                    "DestCityMarketID",
                    "Dest",
                    "CRSDepTime",
                    "DepTime",
                    "DepDelay",
                    "ArrTime",
                    "ArrDelay",
                    "Cancelled",
                    "Diverted",
                ],
            ),
        ],
    ),
    (
        "test_db",
        &[
            (
                "users",
                &["id", "name", "email", "created_at", "updated_at", "status", "role"],
            ),
            (
                "orders",
                &[
                    "id",
                    "customer_id",
                    "order_date",
                    "order_number",
                    "total_amount",
                    "payment_method",
                    "status",
                ],
            ),
        ],
    ),
    (
        "test_tb",
        &[(
            "test_table",
            &["id", "test_name", "test_value", "created_at", "is_active"],
        )],
    ),
];

/// Columns every simulated flat file exposes
const FLAT_FILE_COLUMNS: &[&str] = &[
    "user_id",
    "first_name",
    "last_name",
    "email_address",
    "phone_number",
    "registration_date",
    "subscription_type",
    "last_login",
    "address",
    "country",
];

/// Backend that answers from a canned catalog
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    columns_delay: Duration,
    ingest_delay: Duration,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS_DELAY, DEFAULT_INGEST_DELAY)
    }
}

impl SimulatedBackend {
    pub fn new(columns_delay: Duration, ingest_delay: Duration) -> Self {
        Self {
            columns_delay,
            ingest_delay,
        }
    }

    /// A simulator that resolves without waiting
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn columns_delay(&self) -> Duration {
        self.columns_delay
    }

    pub fn ingest_delay(&self) -> Duration {
        self.ingest_delay
    }

    /// Columns of the first table in `database`
    ///
    /// `host:port/database` style values use their last path segment.
    pub fn catalog_columns(database: &str) -> Vec<String> {
        let name = database.rsplit('/').next().unwrap_or(database);
        CLICKHOUSE_CATALOG
            .iter()
            .find(|(db, _)| *db == name)
            .and_then(|(_, tables)| tables.first())
            .map(|(_, columns)| columns.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn flat_file_columns() -> Vec<String> {
        FLAT_FILE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }
}

async fn pause(delay: Duration) {
    if delay.is_zero() {
        return;
    }
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(delay).await;

    #[cfg(all(target_arch = "wasm32", feature = "wasm"))]
    browser_sleep(delay).await;
}

/// Wait on a `setTimeout` promise; resolves at once when there is no window
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
async fn browser_sleep(delay: Duration) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let millis = timeout_millis(delay);
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if window
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            .is_err()
        {
            let _ = resolve.call0(&js_sys::global());
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

/// `setTimeout` takes a signed 32-bit millisecond count
#[cfg(any(test, all(target_arch = "wasm32", feature = "wasm")))]
fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.as_millis()).unwrap_or(i32::MAX)
}

#[async_trait(?Send)]
impl IngestBackend for SimulatedBackend {
    async fn fetch_columns(
        &self,
        kind: DataSourceKind,
        config: &ConnectionConfig,
    ) -> BackendResult<TablesResponse> {
        validate_fetch(kind, config)?;
        pause(self.columns_delay).await;

        let columns = match kind {
            DataSourceKind::ClickHouse => {
                Self::catalog_columns(config.get(keys::DATABASE).unwrap_or_default())
            }
            DataSourceKind::FlatFile => Self::flat_file_columns(),
        };
        debug!("Simulated {} columns for {}", columns.len(), kind);

        Ok(TablesResponse { columns })
    }

    async fn ingest_data(
        &self,
        kind: DataSourceKind,
        _config: &ConnectionConfig,
        columns: &[String],
    ) -> BackendResult<IngestResult> {
        validate_ingest(columns)?;
        pause(self.ingest_delay).await;

        let records_count = rand::thread_rng().gen_range(RECORDS_RANGE);
        debug!(
            "Simulated ingestion of {} records over {} column(s)",
            records_count,
            columns.len()
        );

        Ok(IngestResult {
            records_count,
            message: format!(
                "Successfully ingested data from {} to {}",
                kind,
                kind.counterpart()
            ),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}
