//! Command-line interface for YTA (YouTube Assistant templates).
//!
//! Each command lives in its own module with its own `clap` argument
//! structure and an `execute` method:
//!
//! ## Offline
//! - `validate` - Check a template's name and content against the rules
//! - `placeholders` - List the placeholder tokens in a piece of content
//!
//! ## Against the API
//! - `list` - Show the template dropdown for one or both types
//! - `create`, `update`, `delete` - Manage templates (validated locally first)
//! - `apply` - Apply a template to a project field
//!
//! ```bash
//! yta validate --name "How-To" --content "How to {{action}}"
//! yta list --type title
//! yta apply --project 3 --name "How-To" --set action="bake bread"
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet` set the log level (mutually exclusive)
//! - `--config` (or `YTA_CONFIG`) points at a config file other than
//!   `~/.yta/config.toml`

mod apply;
mod templates;
mod validate;

pub use apply::ApplyCommand;
pub use templates::{CreateCommand, DeleteCommand, ListCommand, UpdateCommand};
pub use validate::{PlaceholdersCommand, ValidateCommand};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::client::ApiClient;
use crate::config::GlobalConfig;

/// Output format shared by commands that can emit JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with colors
    #[default]
    Text,
    /// Structured JSON for scripts
    Json,
}

/// Settings derived from global flags, injectable for tests.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Explicit log filter; `None` falls back to `RUST_LOG`, then `info`.
    pub log_level: Option<String>,

    /// Config file overriding the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global `tracing` subscriber writing to stderr.
    ///
    /// Calling this more than once is harmless; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Load the global configuration honoring `config_path`.
    pub async fn load_global(&self) -> Result<GlobalConfig> {
        GlobalConfig::load_with_optional(self.config_path.clone()).await
    }

    /// Load configuration and build an API client from it.
    pub async fn api_client(&self) -> Result<ApiClient> {
        let config = self.load_global().await?;
        tracing::debug!(api_url = %config.api_url, workspace = config.workspace_id, "Using API");
        ApiClient::from_config(&config)
    }
}

/// Manage and apply YouTube Assistant templates.
#[derive(Parser, Debug)]
#[command(
    name = "yta",
    about = "YouTube Assistant - manage and apply title and description templates",
    version,
    long_about = "YTA manages reusable title and description templates with {{placeholder}} tokens and applies them to video projects."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file (default: ~/.yta/config.toml)
    #[arg(short, long, global = true, env = "YTA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a template's name and content without contacting the API
    Validate(ValidateCommand),

    /// List the placeholder tokens in a piece of content
    Placeholders(PlaceholdersCommand),

    /// Show the templates of one or both types
    List(ListCommand),

    /// Create a template
    Create(CreateCommand),

    /// Update fields of an existing template
    Update(UpdateCommand),

    /// Delete a template
    Delete(DeleteCommand),

    /// Apply a template to a project
    Apply(ApplyCommand),
}

impl Cli {
    /// Execute with configuration built from the parsed flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate global flags into a [`CliConfig`].
    ///
    /// ```rust,ignore
    /// let cli = Cli::parse_from(["yta", "--verbose", "list"]);
    /// assert_eq!(cli.build_config().log_level, Some("debug".to_string()));
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an injected configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Validate(cmd) => cmd.execute(),
            Commands::Placeholders(cmd) => cmd.execute(),
            Commands::List(cmd) => cmd.execute(&config).await,
            Commands::Create(cmd) => cmd.execute(&config).await,
            Commands::Update(cmd) => cmd.execute(&config).await,
            Commands::Delete(cmd) => cmd.execute(&config).await,
            Commands::Apply(cmd) => cmd.execute(&config).await,
        }
    }
}
