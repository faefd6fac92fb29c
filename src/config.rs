// src/config.rs

//! Backend connection configuration
//!
//! The backend address and timeouts come from (in order of precedence)
//! builder calls, the `CELLARMAN_BACKEND` environment variable, and an
//! optional TOML file at `~/.config/cellarman/config.toml`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default backend address (the local manager process)
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8765";

/// Default timeout for synchronous requests (30 seconds)
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default timeout for establishing a connection (10 seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Backend connection settings
///
/// Note that no timeout applies to an open event stream: a long-running
/// operation holds its stream until the backend sends a terminal event.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend
    pub base_url: String,
    /// Timeout for synchronous (non-streaming) requests, in seconds
    pub request_timeout_secs: u64,
    /// Timeout for establishing any connection, in seconds
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Load configuration from the default file location and environment
    ///
    /// Missing file means defaults. `CELLARMAN_BACKEND` overrides the
    /// base URL from the file.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        if let Ok(url) = std::env::var("CELLARMAN_BACKEND") {
            debug!("backend URL overridden from environment");
            config.base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            Error::ConfigError(format!("failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set the backend base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the synchronous request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Full URL for an API path under the configured base
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Timeout for synchronous requests
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Timeout for establishing connections
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Check that the base URL is well-formed
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::ConfigError(format!("invalid backend URL '{}': {e}", self.base_url)))?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cellarman").join("config.toml"))
    }
}
