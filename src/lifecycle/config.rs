//! # Configuration
//!
//! Every setting has a default, so the widget runs with no configuration at
//! all against a backend on `http://127.0.0.1:8000`. A TOML file can override
//! any subset:
//!
//! ```toml
//! api_base_url = "https://topup.example.com"
//! storage_path = "/var/lib/topup/session.json"
//! poll_interval_ms = 5000
//! request_timeout_secs = 30
//!
//! [retry]
//! initial_backoff_ms = 1000
//! max_backoff_ms = 30000
//! max_consecutive_failures = 10
//! ```
//!
//! Command-line flags and environment variables are applied on top by the
//! binary.

use crate::widget_actor::PollConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Retry policy for failed status checks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// `0` retries forever.
    pub max_consecutive_failures: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            max_consecutive_failures: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Origin of the top-up backend.
    pub api_base_url: String,
    /// File holding the last created order identifier.
    pub storage_path: PathBuf,
    /// Delay between status checks.
    pub poll_interval_ms: u64,
    /// Upper bound for a single HTTP request.
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            storage_path: PathBuf::from(".topup-widget.json"),
            poll_interval_ms: 5000,
            request_timeout_secs: 30,
            retry: RetryConfig::default(),
        }
    }
}

impl WidgetConfig {
    /// Loads and validates a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "api_base_url must be an http(s) URL, got {}",
                self.api_base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".into(),
            ));
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(self.poll_interval_ms),
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry.max_backoff_ms),
            max_consecutive_failures: self.retry.max_consecutive_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WidgetConfig::default();
        config.validate().unwrap();
        assert_eq!(config.poll_config(), PollConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.toml");
        std::fs::write(
            &path,
            "api_base_url = \"https://topup.example.com\"\n[retry]\nmax_consecutive_failures = 0\n",
        )
        .unwrap();

        let config = WidgetConfig::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "https://topup.example.com");
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.retry.max_consecutive_failures, 0);
        assert_eq!(config.retry.max_backoff_ms, 30_000);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.toml");
        std::fs::write(&path, "poll_every = 3\n").unwrap();

        assert!(matches!(
            WidgetConfig::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validation() {
        let mut config = WidgetConfig {
            api_base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.api_base_url = "http://localhost:8000".into();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        config.poll_interval_ms = 5000;
        config.retry.initial_backoff_ms = 60_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            WidgetConfig::from_file(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
