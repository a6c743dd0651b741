//! Subscriber installation for binaries embedding the crate.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::EnvFilter;

use crate::errors::RouteError;

/// Where and how log records are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Append-only log file.
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// Default filter directive; `RUST_LOG` overrides it.
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON records instead of plain text.
    #[serde(default)]
    pub json: bool,
}

fn default_file() -> PathBuf {
    PathBuf::from("logs.txt")
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            level: default_level(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Creates a config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_file(mut self, file: impl AsRef<Path>) -> Self {
        self.file = file.as_ref().to_path_buf();
        self
    }

    /// Sets the default level directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Switches to JSON records.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

static INSTALLED: OnceLock<PathBuf> = OnceLock::new();

/// Installs the global subscriber, appending to the configured file.
///
/// Returns `Ok(true)` when this call installed the subscriber and `Ok(false)`
/// when logging was already initialized; later configs are ignored.
pub fn init_logging(config: &LogConfig) -> Result<bool, RouteError> {
    if INSTALLED.get().is_some() {
        return Ok(false);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RouteError::Config(format!("invalid log level '{}': {e}", config.level)))?,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)?;
    let writer = Mutex::new(file);

    let installed = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer)
            .try_init()
    };

    match installed {
        Ok(()) => {
            let _ = INSTALLED.set(config.file.clone());
            tracing::debug!(file = %config.file.display(), "Logging initialized");
            Ok(true)
        }
        // Another subscriber is already global; leave it in place.
        Err(_) => {
            let _ = INSTALLED.set(config.file.clone());
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();
        assert_eq!(config.file, PathBuf::from("logs.txt"));
        assert_eq!(config.level, "info");
        assert!(!config.json);

        let parsed: LogConfig = serde_json::from_str(r#"{"json": true}"#).unwrap();
        assert!(parsed.json);
        assert_eq!(parsed.level, "info");
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new()
            .with_file("/tmp/route.log")
            .with_level("debug")
            .with_json(true);
        assert_eq!(config.file, PathBuf::from("/tmp/route.log"));
        assert_eq!(config.level, "debug");
        assert!(config.json);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::new().with_file(dir.path().join("logs.txt"));

        assert!(init_logging(&config).is_ok());
        assert!(dir.path().join("logs.txt").exists());

        let other = LogConfig::new().with_file(dir.path().join("other.txt"));
        assert!(!init_logging(&other).unwrap());
        assert!(!dir.path().join("other.txt").exists());
    }
}
