//! CLI error type

use crate::config::ConfigError;
use crate::wizard::{WizardError, WizardStep};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot enter the {wanted} step yet; complete the {got} step first")]
    Redirected { wanted: WizardStep, got: WizardStep },

    #[error("{0}")]
    StepFailed(String),
}
