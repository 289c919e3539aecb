//! Global configuration parsing and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

/// Connection settings for the remote roadmap/playlist generation backend.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Base URL the `/api/...` endpoints are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".into()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_database_path() -> PathBuf {
    PathBuf::from("skilltrail.db")
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// `SQLite` file backing the key-value store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Generation backend settings.
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            backend: BackendConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Backend request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }

    /// Resolve a backend API path (e.g. `/api/roadmaps/generate`) to a full URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.backend.base_url)
    }

    fn validate(&mut self) -> Result<()> {
        if self.backend.timeout_seconds == 0 {
            return Err(AppError::Config(
                "backend.timeout_seconds must be greater than zero".into(),
            ));
        }

        let trimmed = self.backend.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(AppError::Config("backend.base_url must not be empty".into()));
        }

        let url = reqwest::Url::parse(trimmed)
            .map_err(|err| AppError::Config(format!("backend.base_url invalid: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "backend.base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        self.backend.base_url = trimmed.to_owned();

        if self.database_path.as_os_str().is_empty() {
            return Err(AppError::Config("database_path must not be empty".into()));
        }

        Ok(())
    }
}
