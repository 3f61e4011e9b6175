//! # Configuration
//!
//! Where the expense tracker keeps its data and how loudly it logs.
//!
//! Settings are resolved in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.yaml` in the data directory
//! 3. Environment (`EXPENSE_TRACKER_DATA_DIR`, `EXPENSE_TRACKER_LOG`)
//! 4. Command-line flags
//!
//! ## YAML Format
//!
//! ```yaml
//! storage_slot: "household"
//! backup_directory: "~/Documents/expense-backups"
//! log_level: "debug"
//! ```
//!
//! Every key is optional.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::ExportService;

pub const DATA_DIR_ENV: &str = "EXPENSE_TRACKER_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "EXPENSE_TRACKER_LOG";
pub const CONFIG_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_SLOT: &str = "expenses";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the slot files and `config.yaml`
    pub data_directory: PathBuf,
    /// Name of the slot the expense list is stored in
    pub storage_slot: String,
    /// Where backups and CSV exports go when no path is given
    pub backup_directory: PathBuf,
    /// Default `tracing` filter directive
    pub log_level: String,
}

/// Optional overrides read from `config.yaml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    storage_slot: Option<String>,
    #[serde(default)]
    backup_directory: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
}

impl Config {
    /// Defaults rooted at the given data directory
    pub fn for_directory<P: AsRef<Path>>(data_directory: P) -> Self {
        let data_directory = data_directory.as_ref().to_path_buf();
        let backup_directory =
            ExportService::default_export_directory().unwrap_or_else(|| data_directory.clone());

        Self {
            data_directory,
            storage_slot: DEFAULT_SLOT.to_string(),
            backup_directory,
            log_level: "info".to_string(),
        }
    }

    /// Platform data directory for the application
    pub fn default_data_directory() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Expense Tracker")
    }

    /// Resolve the configuration from every layer.
    ///
    /// `data_directory` is the command-line choice, if any; it beats
    /// `EXPENSE_TRACKER_DATA_DIR`, which beats the platform default.
    pub fn load(data_directory: Option<PathBuf>) -> Result<Self> {
        let data_directory = data_directory
            .or_else(|| non_empty_env(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(Self::default_data_directory);

        Self::load_from(data_directory, non_empty_env(LOG_LEVEL_ENV))
    }

    /// Resolve the configuration for a known data directory, applying
    /// `config.yaml` and then an explicit log level if one is given.
    pub fn load_from<P: AsRef<Path>>(data_directory: P, log_level: Option<String>) -> Result<Self> {
        let mut config = Self::for_directory(data_directory);

        let config_path = config.config_file_path();
        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            if yaml_content.trim().is_empty() {
                return Ok(config.with_log_level(log_level));
            }
            let file: ConfigFile = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?;
            debug!("Loaded configuration from {}", config_path.display());
            config.apply_file(file);
        }

        Ok(config.with_log_level(log_level))
    }

    fn with_log_level(mut self, log_level: Option<String>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.data_directory.join(CONFIG_FILE_NAME)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(slot) = file.storage_slot.filter(|s| !s.trim().is_empty()) {
            self.storage_slot = slot.trim().to_string();
        }
        if let Some(dir) = file.backup_directory.filter(|d| !d.trim().is_empty()) {
            self.backup_directory = PathBuf::from(ExportService::new().sanitize_path(&dir));
        }
        if let Some(level) = file.log_level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = Config::load_from(temp_dir.path(), None).unwrap();

        assert_eq!(config.data_directory, temp_dir.path());
        assert_eq!(config.storage_slot, "expenses");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "storage_slot: household\nbackup_directory: /tmp/expense-backups/\nlog_level: debug\n",
        )
        .unwrap();

        let config = Config::load_from(temp_dir.path(), None).unwrap();

        assert_eq!(config.storage_slot, "household");
        assert_eq!(config.backup_directory, PathBuf::from("/tmp/expense-backups"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_explicit_log_level_beats_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.yaml"), "log_level: debug\n").unwrap();

        let config = Config::load_from(temp_dir.path(), Some("warn".to_string())).unwrap();

        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_partial_and_blank_keys_keep_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.yaml"), "storage_slot: \"  \"\n").unwrap();

        let config = Config::load_from(temp_dir.path(), None).unwrap();

        assert_eq!(config.storage_slot, "expenses");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_empty_config_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.yaml"), "\n").unwrap();

        let config = Config::load_from(temp_dir.path(), Some("debug".to_string())).unwrap();

        assert_eq!(config.storage_slot, "expenses");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_malformed_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.yaml"), "storage_slot: [unclosed\n").unwrap();

        assert!(Config::load_from(temp_dir.path(), None).is_err());
    }

    #[test]
    fn test_explicit_data_directory_wins() {
        let temp_dir = TempDir::new().unwrap();

        let config = Config::load(Some(temp_dir.path().to_path_buf())).unwrap();

        assert_eq!(config.data_directory, temp_dir.path());
    }
}
