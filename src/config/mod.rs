//! Configuration management for YTA
//!
//! YTA has a single user-wide configuration file that tells the CLI where the
//! YouTube Assistant API lives and which workspace to act in. See
//! [`GlobalConfig`] for the file location, format and overrides.
//!
//! # Precedence
//!
//! 1. `YTA_API_URL` environment variable (API URL only)
//! 2. File given by `--config` / `YTA_CONFIG`
//! 3. `~/.yta/config.toml` (or `%LOCALAPPDATA%\yta\config.toml`)
//! 4. Built-in defaults
//!
//! ```rust,no_run
//! use yta_cli::config::GlobalConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::load().await?;
//! println!("Workspace {} at {}", config.workspace_id, config.base_url());
//! # Ok(())
//! # }
//! ```

mod global;

pub use global::{API_URL_ENV, GlobalConfig};
