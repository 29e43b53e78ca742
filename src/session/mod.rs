//! Cross-step session state
//!
//! [`SessionStore`] is the single source of truth for what the user chose on
//! each wizard step. The data source kind, the connection configuration and
//! the selected columns are written through to a [`SessionStorage`] on every
//! change; available columns and the ingestion result live in memory only.
//!
//! Storage failures never propagate: a failed read hydrates the default, a
//! failed write leaves the session running in memory and is logged.

mod scope;

pub use scope::{SessionError, SessionScope};

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{ConnectionConfig, DataSourceKind, IngestResult};
use crate::storage::SessionStorage;

/// Storage key holding the raw data source kind
pub const DATA_SOURCE_KEY: &str = "dataSource";
/// Storage key holding the JSON connection configuration
pub const CONNECTION_CONFIG_KEY: &str = "connectionConfig";
/// Storage key holding the JSON list of selected columns
pub const SELECTED_COLUMNS_KEY: &str = "selectedColumns";

/// Every key this store writes
pub const PERSISTED_KEYS: [&str; 3] = [DATA_SOURCE_KEY, CONNECTION_CONFIG_KEY, SELECTED_COLUMNS_KEY];

/// Snapshot of the wizard's cross-step data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub data_source: DataSourceKind,
    pub connection_config: ConnectionConfig,
    /// User click order; duplicates are not rejected here
    pub selected_columns: Vec<String>,
    /// Result of the last successful column fetch
    pub available_columns: Vec<String>,
    pub ingest_result: Option<IngestResult>,
}

/// Session state with write-through persistence
pub struct SessionStore {
    state: SessionState,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Create a store, hydrating each persisted field from `storage`
    ///
    /// # Example
    ///
    /// ```rust
    /// use ingest_wizard::session::SessionStore;
    /// use ingest_wizard::storage::MemorySessionStorage;
    ///
    /// let storage = MemorySessionStorage::new();
    /// let mut store = SessionStore::new(storage.clone());
    /// store.set_selected_columns(vec!["id".to_string()]);
    ///
    /// let reloaded = SessionStore::new(storage);
    /// assert_eq!(reloaded.selected_columns(), ["id".to_string()]);
    /// ```
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self::with_storage(Box::new(storage))
    }

    pub fn with_storage(storage: Box<dyn SessionStorage>) -> Self {
        let state = SessionState {
            data_source: hydrate_data_source(&*storage),
            connection_config: hydrate_json(&*storage, CONNECTION_CONFIG_KEY),
            selected_columns: hydrate_json(&*storage, SELECTED_COLUMNS_KEY),
            available_columns: Vec::new(),
            ingest_result: None,
        };

        debug!(
            "Hydrated session: source={}, {} config key(s), {} selected column(s)",
            state.data_source,
            state.connection_config.len(),
            state.selected_columns.len()
        );

        Self { state, storage }
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn data_source(&self) -> DataSourceKind {
        self.state.data_source
    }

    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.state.connection_config
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.state.selected_columns
    }

    pub fn available_columns(&self) -> &[String] {
        &self.state.available_columns
    }

    pub fn ingest_result(&self) -> Option<&IngestResult> {
        self.state.ingest_result.as_ref()
    }

    /// Switch the data source kind
    ///
    /// Selected and available columns are cleared in the same step, so no
    /// reader ever sees columns that belong to the previous kind.
    pub fn set_data_source(&mut self, kind: DataSourceKind) {
        self.state.data_source = kind;
        self.state.selected_columns.clear();
        self.state.available_columns.clear();

        self.persist_raw(DATA_SOURCE_KEY, kind.as_str());
        self.persist_json(SELECTED_COLUMNS_KEY, &self.state.selected_columns);
    }

    /// Shallow-merge `partial` into the connection configuration
    pub fn set_connection_config(&mut self, partial: ConnectionConfig) {
        self.state.connection_config.merge(partial);
        self.persist_json(CONNECTION_CONFIG_KEY, &self.state.connection_config);
    }

    /// Replace the selected columns
    pub fn set_selected_columns(&mut self, columns: Vec<String>) {
        self.state.selected_columns = columns;
        self.persist_json(SELECTED_COLUMNS_KEY, &self.state.selected_columns);
    }

    /// Replace the available columns (not persisted)
    pub fn set_available_columns(&mut self, columns: Vec<String>) {
        self.state.available_columns = columns;
    }

    /// Replace the ingestion result (not persisted)
    pub fn set_ingest_result(&mut self, result: Option<IngestResult>) {
        self.state.ingest_result = result;
    }

    /// Remove `column` from the selection if present, append it otherwise
    ///
    /// Returns whether the column is selected afterwards.
    pub fn toggle_column(&mut self, column: &str) -> bool {
        let mut columns = self.state.selected_columns.clone();
        let selected = if columns.iter().any(|c| c == column) {
            columns.retain(|c| c != column);
            false
        } else {
            columns.push(column.to_string());
            true
        };
        self.set_selected_columns(columns);
        selected
    }

    /// Select every available column, in listing order
    pub fn select_all(&mut self) {
        let columns = self.state.available_columns.clone();
        self.set_selected_columns(columns);
    }

    pub fn deselect_all(&mut self) {
        self.set_selected_columns(Vec::new());
    }

    /// Restore defaults and erase every persisted key
    pub fn reset_all(&mut self) {
        self.state = SessionState::default();

        for key in PERSISTED_KEYS {
            if let Err(e) = self.storage.remove_item(key) {
                warn!("Failed to remove '{}' from session storage: {}", key, e);
            }
        }
    }

    fn persist_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.persist_raw(key, &json),
            Err(e) => warn!("Failed to serialize '{}' for session storage: {}", key, e),
        }
    }

    fn persist_raw(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn!(
                "Failed to persist '{}', continuing with in-memory state: {}",
                key, e
            );
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn read_item(storage: &dyn SessionStorage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read '{}' from session storage: {}", key, e);
            None
        }
    }
}

fn hydrate_data_source(storage: &dyn SessionStorage) -> DataSourceKind {
    let Some(raw) = read_item(storage, DATA_SOURCE_KEY) else {
        return DataSourceKind::default();
    };
    raw.parse().unwrap_or_else(|e| {
        warn!("Ignoring stored data source: {}", e);
        DataSourceKind::default()
    })
}

fn hydrate_json<T>(storage: &dyn SessionStorage, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    let Some(raw) = read_item(storage, key) else {
        return T::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring corrupt '{}' in session storage: {}", key, e);
        T::default()
    })
}
