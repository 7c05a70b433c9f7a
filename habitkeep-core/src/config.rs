//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/habitkeep/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/habitkeep/` (~/.config/habitkeep/)
//! - Data: `$XDG_DATA_HOME/habitkeep/` (~/.local/share/habitkeep/)
//! - State/Logs: `$XDG_STATE_HOME/habitkeep/` (~/.local/state/habitkeep/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the default database location
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path, falling back to defaults if
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the config directory (~/.config/habitkeep)
    pub fn config_dir() -> PathBuf {
        xdg_config_home().join("habitkeep")
    }

    /// Returns the config file path (~/.config/habitkeep/config.toml)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Returns the data directory (~/.local/share/habitkeep)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("habitkeep")
    }

    /// Returns the state directory for logs (~/.local/state/habitkeep)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("habitkeep")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("habitkeep.log")
    }

    /// Returns the database path, honoring the configured override.
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("habitkeep.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(Config::config_path().ends_with("habitkeep/config.toml"));
        assert!(Config::log_path().ends_with("habitkeep/habitkeep.log"));

        let config = Config::default();
        assert!(config.database_path().ends_with("habitkeep/habitkeep.db"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_database_path_override() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            database_path = "/tmp/custom.db"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.storage.database_path.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
