//! Wizard flow controller
//!
//! Sequences the three steps (connection, schema, ingestion) over one
//! mounted [`SessionStore`] and one [`Backend`]. Each step's prerequisites
//! are checked on entry; when they are not met the controller redirects to
//! the earliest step that can satisfy them.
//!
//! The controller is driven from a single event loop. Methods take `&self`
//! so that a UI can start a request and keep handling input while it is
//! outstanding; a second request of the same kind is refused with
//! [`WizardError::Busy`] until the first resolves.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info};

use crate::backend::{Backend, BackendError, IngestBackend};
use crate::config::WizardConfig;
use crate::models::{ConnectionConfig, DataSourceKind, IngestResult};
use crate::session::{SessionError, SessionScope, SessionState, SessionStore};
use crate::storage::SessionStorage;

pub const STATUS_FETCHING: &str = "Fetching columns...";
pub const STATUS_COLUMNS_LOADED: &str = "Columns loaded successfully";
pub const STATUS_READY: &str = "Ready to ingest data";
pub const STATUS_INGESTING: &str = "Ingesting data...";
pub const STATUS_INGESTED: &str = "Ingestion completed successfully";
pub const STATUS_ERROR: &str = "Error";

pub const MSG_CLICKHOUSE_FIELDS: &str =
    "Please fill in required ClickHouse fields (Host, Port, Database)";
pub const MSG_FILE_NAME: &str = "Please provide a file name";
pub const MSG_SELECT_COLUMN: &str = "Please select at least one column";

/// A wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WizardStep {
    #[default]
    Connection,
    Schema,
    Ingestion,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Connection => "connection",
            WizardStep::Schema => "schema",
            WizardStep::Ingestion => "ingestion",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the wizard
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Missing input, caught before any backend call
    #[error("{0}")]
    Validation(String),

    /// A request of the same kind is still outstanding
    #[error("A {0} is already in progress")]
    Busy(&'static str),

    #[error("Column '{0}' is not one of the available columns")]
    UnknownColumn(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The session changed while the request was outstanding; its result was dropped
    #[error("The {0} result was discarded because the session changed")]
    Superseded(&'static str),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Marks one kind of request as outstanding for as long as it lives
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Step sequencing over a session store and a backend
pub struct WizardController {
    session: RefCell<SessionScope>,
    backend: RefCell<Rc<Backend>>,
    step: Cell<WizardStep>,
    status: RefCell<String>,
    error: RefCell<Option<String>>,
    fetching: Cell<bool>,
    ingesting: Cell<bool>,
    /// Bumped by every change that invalidates an outstanding request
    generation: Cell<u64>,
}

impl WizardController {
    /// Mount a session over `storage` and start on the connection step
    ///
    /// # Example
    ///
    /// ```rust
    /// use ingest_wizard::backend::{Backend, SimulatedBackend};
    /// use ingest_wizard::storage::MemorySessionStorage;
    /// use ingest_wizard::wizard::{WizardController, WizardStep};
    ///
    /// let wizard = WizardController::new(
    ///     MemorySessionStorage::new(),
    ///     Backend::Simulated(SimulatedBackend::instant()),
    /// );
    /// assert_eq!(wizard.step(), WizardStep::Connection);
    /// ```
    pub fn new(storage: impl SessionStorage + 'static, backend: Backend) -> Self {
        info!("Starting wizard with {}", backend.describe());
        Self {
            session: RefCell::new(SessionScope::mounted(storage)),
            backend: RefCell::new(Rc::new(backend)),
            step: Cell::new(WizardStep::Connection),
            status: RefCell::new(String::new()),
            error: RefCell::new(None),
            fetching: Cell::new(false),
            ingesting: Cell::new(false),
            generation: Cell::new(0),
        }
    }

    /// Mount a session with the backend selected by `config`
    pub fn from_config(storage: impl SessionStorage + 'static, config: &WizardConfig) -> Self {
        Self::new(storage, config.build_backend())
    }

    pub fn step(&self) -> WizardStep {
        self.step.get()
    }

    /// Latest status line
    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Latest user-visible error, cleared when a step is re-entered or retried
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.get()
    }

    pub fn is_ingesting(&self) -> bool {
        self.ingesting.get()
    }

    /// Whether any backend request is outstanding
    pub fn is_loading(&self) -> bool {
        self.is_fetching() || self.is_ingesting()
    }

    pub fn backend(&self) -> Rc<Backend> {
        Rc::clone(&self.backend.borrow())
    }

    /// Snapshot of the session state
    pub fn state(&self) -> Result<SessionState, WizardError> {
        self.with_session(SessionStore::snapshot)
    }

    /// Run `f` against the mounted store
    pub fn with_session<R>(&self, f: impl FnOnce(&SessionStore) -> R) -> Result<R, WizardError> {
        let scope = self.session.borrow();
        Ok(f(scope.store()?))
    }

    /// Run `f` against the mounted store, mutably
    pub fn with_session_mut<R>(
        &self,
        f: impl FnOnce(&mut SessionStore) -> R,
    ) -> Result<R, WizardError> {
        let mut scope = self.session.borrow_mut();
        Ok(f(scope.store_mut()?))
    }

    /// Tear the session down; later session access fails with
    /// [`SessionError::NoActiveSession`]
    pub fn unmount(&self) {
        self.session.borrow_mut().unmount();
    }

    /// Switch the data source kind (clears both column lists)
    pub fn select_source(&self, kind: DataSourceKind) -> Result<(), WizardError> {
        self.with_session_mut(|s| s.set_data_source(kind))?;
        self.bump_generation();
        self.clear_error();
        Ok(())
    }

    /// Merge `partial` into the connection configuration
    pub fn update_connection(&self, partial: ConnectionConfig) -> Result<(), WizardError> {
        self.with_session_mut(|s| s.set_connection_config(partial))?;
        self.bump_generation();
        Ok(())
    }

    /// Check the required connection fields for the current kind
    pub fn validate_connection(&self) -> Result<(), WizardError> {
        let (kind, complete) = self.with_session(|s| {
            let kind = s.data_source();
            (kind, s.connection_config().is_complete_for(kind))
        })?;

        if complete {
            return Ok(());
        }
        let message = match kind {
            DataSourceKind::ClickHouse => MSG_CLICKHOUSE_FIELDS,
            DataSourceKind::FlatFile => MSG_FILE_NAME,
        };
        Err(WizardError::Validation(message.to_string()))
    }

    /// Leave the connection step
    ///
    /// Stays on the connection step with a validation message when required
    /// fields are missing; otherwise enters the schema step and loads its
    /// columns. A failed load leaves the wizard on the schema step with the
    /// error recorded for a retry.
    pub async fn submit_connection(&self) -> Result<WizardStep, WizardError> {
        if let Err(e) = self.validate_connection() {
            self.set_error(&e);
            return Err(e);
        }
        Ok(self.enter_schema().await)
    }

    /// Navigate to `target`, applying entry guards
    ///
    /// Returns the step actually entered, which is an earlier one when the
    /// target's prerequisites are not met.
    pub fn go_to(&self, target: WizardStep) -> Result<WizardStep, WizardError> {
        let (complete, has_selection) = self.with_session(|s| {
            (
                s.connection_config().is_complete_for(s.data_source()),
                !s.selected_columns().is_empty(),
            )
        })?;

        let resolved = match target {
            WizardStep::Connection => WizardStep::Connection,
            WizardStep::Schema | WizardStep::Ingestion if !complete => WizardStep::Connection,
            WizardStep::Ingestion if !has_selection => WizardStep::Schema,
            other => other,
        };
        if resolved != target {
            debug!("Redirecting from {} to {}", target, resolved);
        }

        self.step.set(resolved);
        self.clear_error();
        *self.status.borrow_mut() = match resolved {
            WizardStep::Ingestion => STATUS_READY.to_string(),
            _ => String::new(),
        };
        Ok(resolved)
    }

    /// Enter the schema step and load its columns
    ///
    /// Load failures are recorded in [`status`](Self::status) and
    /// [`error`](Self::error), not returned.
    pub async fn enter_schema(&self) -> WizardStep {
        match self.go_to(WizardStep::Schema) {
            Ok(WizardStep::Schema) => {
                if let Err(e) = self.load_columns().await {
                    debug!("Column load on schema entry failed: {}", e);
                }
                WizardStep::Schema
            }
            Ok(step) => step,
            Err(e) => {
                self.set_error(&e);
                self.step()
            }
        }
    }

    pub fn back_to_connection(&self) -> Result<WizardStep, WizardError> {
        self.go_to(WizardStep::Connection)
    }

    pub async fn back_to_schema(&self) -> WizardStep {
        self.enter_schema().await
    }

    /// Fetch the available columns for the current configuration
    ///
    /// Also the retry affordance after a failed load.
    pub async fn load_columns(&self) -> Result<Vec<String>, WizardError> {
        let Some(_in_flight) = InFlight::acquire(&self.fetching) else {
            return Err(WizardError::Busy("column fetch"));
        };

        if let Err(e) = self.validate_connection() {
            self.fail(&e);
            return Err(e);
        }
        let (kind, config) =
            self.with_session(|s| (s.data_source(), s.connection_config().clone()))?;

        self.set_status(STATUS_FETCHING);
        self.clear_error();

        let generation = self.generation.get();
        let backend = self.backend();
        let result = backend.fetch_columns(kind, &config).await;

        if self.generation.get() != generation {
            debug!("Discarding column listing for {}: session changed", kind);
            self.settle_status(STATUS_FETCHING);
            return Err(WizardError::Superseded("column fetch"));
        }

        match result {
            Ok(response) => {
                let columns = response.columns;
                self.with_session_mut(|s| s.set_available_columns(columns.clone()))?;
                self.set_status(STATUS_COLUMNS_LOADED);
                Ok(columns)
            }
            Err(e) => {
                let err = WizardError::from(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Select one of the available columns, or deselect any selected one
    ///
    /// Returns whether the column is selected afterwards.
    pub fn toggle_column(&self, column: &str) -> Result<bool, WizardError> {
        self.with_session_mut(|s| {
            let selected = s.selected_columns().iter().any(|c| c == column);
            if !selected && !s.available_columns().iter().any(|c| c == column) {
                return Err(WizardError::UnknownColumn(column.to_string()));
            }
            Ok(s.toggle_column(column))
        })?
    }

    pub fn select_all(&self) -> Result<(), WizardError> {
        self.with_session_mut(SessionStore::select_all)
    }

    pub fn deselect_all(&self) -> Result<(), WizardError> {
        self.with_session_mut(SessionStore::deselect_all)
    }

    /// Leave the schema step
    pub fn continue_to_ingestion(&self) -> Result<WizardStep, WizardError> {
        let has_selection = self.with_session(|s| !s.selected_columns().is_empty())?;
        if !has_selection {
            let err = WizardError::Validation(MSG_SELECT_COLUMN.to_string());
            self.set_error(&err);
            return Err(err);
        }
        self.go_to(WizardStep::Ingestion)
    }

    /// Run the ingestion job for the current selection
    pub async fn start_ingestion(&self) -> Result<IngestResult, WizardError> {
        let Some(_in_flight) = InFlight::acquire(&self.ingesting) else {
            return Err(WizardError::Busy("ingestion"));
        };

        let (kind, config, columns) = self.with_session(|s| {
            (
                s.data_source(),
                s.connection_config().clone(),
                s.selected_columns().to_vec(),
            )
        })?;
        if columns.is_empty() {
            let err = WizardError::Validation(MSG_SELECT_COLUMN.to_string());
            self.fail(&err);
            return Err(err);
        }

        self.set_status(STATUS_INGESTING);
        self.clear_error();

        let generation = self.generation.get();
        let backend = self.backend();
        let outcome = backend.ingest_data(kind, &config, &columns).await;

        if self.generation.get() != generation {
            info!("Discarding ingestion result for {}: session changed", kind);
            self.settle_status(STATUS_INGESTING);
            return Err(WizardError::Superseded("ingestion"));
        }

        match outcome {
            Ok(result) => {
                self.with_session_mut(|s| s.set_ingest_result(Some(result.clone())))?;
                self.set_status(STATUS_INGESTED);
                Ok(result)
            }
            Err(e) => {
                let err = WizardError::from(e);
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Clear everything, including persisted keys, and return to the first step
    pub fn start_over(&self) -> Result<WizardStep, WizardError> {
        self.with_session_mut(SessionStore::reset_all)?;
        self.bump_generation();
        self.step.set(WizardStep::Connection);
        self.set_status("");
        self.clear_error();
        Ok(WizardStep::Connection)
    }

    /// Swap the backend
    ///
    /// On the schema step the columns are reloaded through the new backend.
    pub async fn set_backend(&self, backend: Backend) -> Result<(), WizardError> {
        info!("Switching to {}", backend.describe());
        *self.backend.borrow_mut() = Rc::new(backend);

        if self.step() == WizardStep::Schema && !self.is_fetching() {
            self.load_columns().await?;
        }
        Ok(())
    }

    fn set_status(&self, status: &str) {
        *self.status.borrow_mut() = status.to_string();
    }

    /// Clear `pending` if it is still the status line
    fn settle_status(&self, pending: &str) {
        let mut status = self.status.borrow_mut();
        if *status == pending {
            status.clear();
        }
    }

    fn bump_generation(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    fn set_error(&self, err: &WizardError) {
        *self.error.borrow_mut() = Some(err.to_string());
    }

    fn clear_error(&self) {
        *self.error.borrow_mut() = None;
    }

    fn fail(&self, err: &WizardError) {
        self.set_status(STATUS_ERROR);
        self.set_error(err);
    }
}

impl fmt::Debug for WizardController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardController")
            .field("step", &self.step.get())
            .field("status", &self.status.borrow())
            .field("fetching", &self.fetching.get())
            .field("ingesting", &self.ingesting.get())
            .finish_non_exhaustive()
    }
}
