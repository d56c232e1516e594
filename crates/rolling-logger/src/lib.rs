//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to a size-rotated file and
//! keeps the latest lines in memory. `log` records are bridged, so crates
//! using the `log` facade end up in the same file.

mod writer;

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub use writer::{RollingConfig, RollingFile};

static LOG_FILE: OnceLock<RollingFile> = OnceLock::new();

/// Initialize the global logger with default limits
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, RollingConfig::default())
}

/// Initialize the global logger
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, config: RollingConfig) -> Result<(), String> {
    let file = RollingFile::open(&log_dir, app_name, config)
        .map_err(|e| format!("Failed to open log file in {}: {}", log_dir.display(), e))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(file.clone())
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    let _ = LOG_FILE.set(file);
    tracing::info!(app = app_name, "logger initialized at {}", chrono::Local::now().to_rfc3339());
    Ok(())
}

/// Log an info line
pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

/// Log an error line
pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Latest buffered lines, oldest first; empty before init
pub fn recent_lines() -> Vec<String> {
    LOG_FILE.get().map(RollingFile::recent_lines).unwrap_or_default()
}

/// Path of the active log file, once initialized
pub fn log_path() -> Option<PathBuf> {
    LOG_FILE.get().map(RollingFile::path)
}

fn ensure_initialized() -> Result<(), String> {
    if LOG_FILE.get().is_none() {
        return Err("logger not initialized".to_string());
    }
    Ok(())
}
