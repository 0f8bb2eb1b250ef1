//! Global configuration for YTA.
//!
//! The file lives at a platform-specific location:
//!
//! - **Unix/macOS**: `~/.yta/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\yta\config.toml`
//!
//! The CLI's `--config` flag (or the `YTA_CONFIG` environment variable it
//! reads) points at another file. A missing file is not an error; every
//! field has a default.
//!
//! ```toml
//! api_url = "http://localhost:8000"
//! workspace_id = 1
//! request_timeout_secs = 30
//! ```
//!
//! `YTA_API_URL`, when set, replaces `api_url` after the file is read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WORKSPACE_ID};
use crate::core::YtaError;

/// Environment variable overriding [`GlobalConfig::api_url`].
pub const API_URL_ENV: &str = "YTA_API_URL";

/// User-wide settings for talking to the YouTube Assistant API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Base URL of the API, without a trailing `/api`
    pub api_url: String,

    /// Workspace every request is scoped to (sent as `X-Workspace-Id`)
    pub workspace_id: i64,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            workspace_id: DEFAULT_WORKSPACE_ID,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` if given, otherwise from the default location.
    ///
    /// Environment overrides are applied in both cases.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        let config = if path.exists() {
            Self::load_from(&path).await?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Load from a specific file without applying environment overrides.
    ///
    /// ```rust,no_run
    /// use yta_cli::config::GlobalConfig;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let config = GlobalConfig::load_from(Path::new("/custom/config.toml")).await?;
    /// println!("API: {}", config.api_url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path).await
    }

    /// Write as pretty TOML, creating parent directories. On Unix the file
    /// is restricted to its owner.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(path)
                .await
                .with_context(|| format!("Failed to read permissions for {}", path.display()))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).await.with_context(|| {
                format!("Failed to set permissions on {}", path.display())
            })?;
        }

        Ok(())
    }

    /// Platform default path of the config file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("yta")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".yta")
        };

        Ok(config_dir.join("config.toml"))
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!("Using API URL from {API_URL_ENV}: {url}");
                self.api_url = url.to_string();
            }
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), YtaError> {
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(YtaError::ConfigError {
                message: format!("api_url must start with http:// or https://, got '{url}'"),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(YtaError::ConfigError {
                message: "request_timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.workspace_id, 1);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let config = GlobalConfig {
            api_url: "https://yta.example.com/".to_string(),
            workspace_id: 7,
            request_timeout_secs: 5,
        };
        config.save_to(&path).await.unwrap();

        let loaded = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.base_url(), "https://yta.example.com");
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "workspace_id = 3\n").await.unwrap();

        let loaded = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded.workspace_id, 3);
        assert_eq!(loaded.api_url, DEFAULT_API_URL);
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "api_url = \"localhost:8000\"\n").await.unwrap();

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("api_url"));
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_file_gives_defaults() {
        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::remove_var(API_URL_ENV) };
        let temp = TempDir::new().unwrap();
        let config =
            GlobalConfig::load_with_optional(Some(temp.path().join("absent.toml"))).await.unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    #[serial]
    async fn test_env_overrides_api_url() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        GlobalConfig::default().save_to(&path).await.unwrap();

        // SAFETY: serialized with other env-mutating tests
        unsafe { std::env::set_var(API_URL_ENV, "https://override.example.com") };
        let config = GlobalConfig::load_with_optional(Some(path)).await;
        unsafe { std::env::remove_var(API_URL_ENV) };

        assert_eq!(config.unwrap().api_url, "https://override.example.com");
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_config_file_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        GlobalConfig::default().save_to(&path).await.unwrap();

        let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "Config file should have 600 permissions");
    }
}
