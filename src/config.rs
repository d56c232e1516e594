//! Application configuration
//!
//! Read from a JSON file; every field has a default so a partial (or
//! missing) file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use minidot_db::{DomainError, DomainResult};

const APP_DIR: &str = "minidot";

/// Platform data directory for the app
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(APP_DIR)
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Deletions kept for undo; `null` keeps all of them
    pub undo_capacity: Option<usize>,
    /// How long the "undo available" signal stays up
    pub undo_window_ms: u64,
    pub toast_ms: u64,
    pub notifier: NotifierConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            db_path: data_dir.join("minidot.db"),
            log_dir: data_dir.join("logs"),
            undo_capacity: None,
            undo_window_ms: 4_000,
            toast_ms: 2_000,
            notifier: NotifierConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> DomainResult<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)
            .map_err(|e| DomainError::Validation(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> DomainResult<()> {
        if self.undo_capacity == Some(0) {
            return Err(DomainError::Validation("undo_capacity must be at least 1".to_string()));
        }
        if self.notifier.interval_secs == 0 {
            return Err(DomainError::Validation("notifier.interval_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            undo_capacity: self.undo_capacity,
            undo_window: Duration::from_millis(self.undo_window_ms),
            toast_duration: Duration::from_millis(self.toast_ms),
        }
    }
}

/// Settings the todo store needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub undo_capacity: Option<usize>,
    pub undo_window: Duration,
    pub toast_duration: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        AppConfig::default().store_config()
    }
}

/// Due-date reminder polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    pub interval_secs: u64,
    pub initial_delay_secs: u64,
    /// How far ahead due todos are fetched
    pub lookahead_hours: u32,
    /// Remind once a todo is due within this many minutes
    pub remind_within_minutes: i64,
    /// Where already-sent reminders are remembered
    pub notified_log_path: PathBuf,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            interval_secs: 15 * 60,
            initial_delay_secs: 5,
            lookahead_hours: 24,
            remind_within_minutes: 120,
            notified_log_path: default_data_dir().join("notified.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.undo_capacity, None);
        assert_eq!(config.store_config().undo_window, Duration::from_secs(4));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "undo_capacity": 20, "notifier": { "interval_secs": 60 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.undo_capacity, Some(20));
        assert_eq!(config.notifier.interval_secs, 60);
        assert_eq!(config.notifier.lookahead_hours, 24);
        assert_eq!(config.toast_ms, 2_000);
    }

    #[test]
    fn test_malformed_file_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(DomainError::Validation(_))));

        std::fs::write(&path, r#"{ "undo_capacity": 0 }"#).unwrap();
        assert!(matches!(AppConfig::load(&path), Err(DomainError::Validation(_))));
    }
}
