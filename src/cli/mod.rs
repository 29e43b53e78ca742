//! CLI module for the ingest-wizard binary
//!
//! Every invocation mounts a fresh wizard over a [`FileSessionStorage`], so
//! the persisted choices carry over between commands the same way they carry
//! over a page reload. Available columns are not persisted and are fetched
//! again by the commands that need them.

pub mod error;
pub mod output;

pub use error::CliError;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use crate::config::{BackendMode, WizardConfig};
use crate::models::connection::keys;
use crate::models::{ConnectionConfig, DataSourceKind};
use crate::storage::filesystem::FileSessionStorage;
use crate::wizard::{WizardController, WizardStep};

#[derive(Debug, Parser)]
#[command(name = "ingest-wizard", version, about = "Configure a data source, pick columns and run an ingestion")]
pub struct Cli {
    /// Session file holding the persisted wizard choices
    #[arg(long, global = true, default_value = ".ingest-wizard/session.json")]
    pub state: PathBuf,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Talk to the ingestion service instead of the simulator
    #[arg(long, global = true, conflicts_with = "simulated")]
    pub network: bool,

    /// Use the simulator even if the configuration selects the network
    #[arg(long, global = true)]
    pub simulated: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the persisted session
    Status,
    /// Choose the data source and connection settings
    Connect(ConnectArgs),
    /// List the columns of the configured source
    Columns,
    /// Add columns to the selection
    Select(SelectArgs),
    /// Run the ingestion for the selected columns
    Ingest,
    /// Forget everything and start over
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Clickhouse,
    FlatFile,
}

impl From<SourceArg> for DataSourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Clickhouse => DataSourceKind::ClickHouse,
            SourceArg::FlatFile => DataSourceKind::FlatFile,
        }
    }
}

#[derive(Debug, Default, Args)]
pub struct ConnectArgs {
    /// Data source kind; changing it clears the column selection
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub database: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub jwt_token: Option<String>,
    #[arg(long)]
    pub file_name: Option<String>,
    #[arg(long)]
    pub delimiter: Option<String>,
}

impl ConnectArgs {
    /// The settings given on the command line, as a partial configuration
    pub fn partial_config(&self) -> ConnectionConfig {
        [
            (keys::HOST, &self.host),
            (keys::PORT, &self.port),
            (keys::DATABASE, &self.database),
            (keys::USERNAME, &self.username),
            (keys::JWT_TOKEN, &self.jwt_token),
            (keys::FILE_NAME, &self.file_name),
            (keys::DELIMITER, &self.delimiter),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v.clone())))
        .collect()
    }
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    /// Column names, added in the order given
    pub columns: Vec<String>,
    /// Select every available column
    #[arg(long, conflicts_with_all = ["columns", "none"])]
    pub all: bool,
    /// Clear the selection
    #[arg(long, conflicts_with = "columns")]
    pub none: bool,
}

impl Cli {
    /// Configuration after applying `--config`, `--network` and `--simulated`
    pub fn wizard_config(&self) -> Result<WizardConfig, CliError> {
        let config = match &self.config {
            Some(path) => WizardConfig::from_file(path)?,
            None => WizardConfig::default(),
        };
        Ok(if self.network {
            config.with_backend(BackendMode::Network)
        } else if self.simulated {
            config.with_backend(BackendMode::Simulated)
        } else {
            config
        })
    }
}

/// Execute one CLI invocation
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.wizard_config()?;
    debug!("Using session file {}", cli.state.display());
    let wizard = WizardController::from_config(FileSessionStorage::new(&cli.state), &config);

    match cli.command {
        Command::Status => {
            let state = wizard.state()?;
            print!("{}", output::format_state(&state, &wizard.backend().describe()));
        }
        Command::Connect(args) => {
            if let Some(source) = args.source {
                wizard.select_source(source.into())?;
            }
            wizard.update_connection(args.partial_config())?;
            wizard.submit_connection().await?;
            report_columns(&wizard)?;
        }
        Command::Columns => {
            enter_schema(&wizard).await?;
            report_columns(&wizard)?;
        }
        Command::Select(args) => {
            enter_schema(&wizard).await?;
            if args.all {
                wizard.select_all()?;
            } else if args.none {
                wizard.deselect_all()?;
            } else {
                for column in &args.columns {
                    let already = wizard
                        .with_session(|s| s.selected_columns().iter().any(|c| c == column))?;
                    if !already {
                        wizard.toggle_column(column)?;
                    }
                }
            }
            report_columns(&wizard)?;
        }
        Command::Ingest => {
            let step = wizard.go_to(WizardStep::Ingestion)?;
            if step != WizardStep::Ingestion {
                return Err(CliError::Redirected {
                    wanted: WizardStep::Ingestion,
                    got: step,
                });
            }
            println!("{}", wizard.status());
            let result = wizard.start_ingestion().await?;
            print!("{}", output::format_result(&result));
        }
        Command::Reset => {
            wizard.start_over()?;
            println!("Session cleared");
        }
    }
    Ok(())
}

/// Enter the schema step, failing if it redirected or the load failed
async fn enter_schema(wizard: &WizardController) -> Result<(), CliError> {
    let step = wizard.enter_schema().await;
    if step != WizardStep::Schema {
        return Err(CliError::Redirected {
            wanted: WizardStep::Schema,
            got: step,
        });
    }
    if let Some(message) = wizard.error() {
        return Err(CliError::StepFailed(message));
    }
    Ok(())
}

fn report_columns(wizard: &WizardController) -> Result<(), CliError> {
    if let Some(message) = wizard.error() {
        return Err(CliError::StepFailed(message));
    }
    let state = wizard.state()?;
    println!("{}", wizard.status());
    print!(
        "{}",
        output::format_columns(&state.available_columns, &state.selected_columns)
    );
    Ok(())
}
