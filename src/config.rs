//! Configuration types for the wizard
//!
//! Selects the backend and tunes the simulator. The TOML form is:
//!
//! ```toml
//! backend = "network"           # or "simulated" (default)
//! api_base_url = "http://localhost:8080/api"
//! columns_delay_ms = 800
//! ingest_delay_ms = 2000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::api::DEFAULT_BASE_URL;
use crate::backend::simulated::{DEFAULT_COLUMNS_DELAY, DEFAULT_INGEST_DELAY};
use crate::backend::{Backend, HttpBackend, SimulatedBackend};

/// Which backend the wizard talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// The ingestion service over HTTP
    Network,
    /// Canned responses, no service required
    #[default]
    Simulated,
}

/// Error loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Wizard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub backend: BackendMode,
    /// Base URL for the network backend
    pub api_base_url: String,
    /// Simulated column listing latency in milliseconds
    pub columns_delay_ms: u64,
    /// Simulated ingestion latency in milliseconds
    pub ingest_delay_ms: u64,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            backend: BackendMode::default(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            columns_delay_ms: DEFAULT_COLUMNS_DELAY.as_millis() as u64,
            ingest_delay_ms: DEFAULT_INGEST_DELAY.as_millis() as u64,
        }
    }
}

impl WizardConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Builder method to override the backend mode
    pub fn with_backend(mut self, mode: BackendMode) -> Self {
        self.backend = mode;
        self
    }

    /// The network backend this configuration points at
    pub fn network_backend(&self) -> HttpBackend {
        HttpBackend::new(self.api_base_url.clone())
    }

    /// The simulator with this configuration's delays
    pub fn simulated_backend(&self) -> SimulatedBackend {
        SimulatedBackend::new(
            Duration::from_millis(self.columns_delay_ms),
            Duration::from_millis(self.ingest_delay_ms),
        )
    }

    /// The backend selected by [`WizardConfig::backend`]
    pub fn build_backend(&self) -> Backend {
        match self.backend {
            BackendMode::Network => Backend::Network(self.network_backend()),
            BackendMode::Simulated => Backend::Simulated(self.simulated_backend()),
        }
    }
}
