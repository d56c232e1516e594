use std::path::PathBuf;
use std::sync::Arc;

use minidot::config::{default_config_path, AppConfig};
use minidot::{LogSink, NotifiedLog, Notifier, TodoStore};
use minidot_db::{init_db, SqliteRepository};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("minidot: {}", e);
        if let Some(path) = rolling_logger::log_path() {
            eprintln!("last log lines from {}:", path.display());
            let lines = rolling_logger::recent_lines();
            for line in &lines[lines.len().saturating_sub(20)..] {
                eprintln!("  {}", line);
            }
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let config = AppConfig::load(&config_path).map_err(|e| e.to_string())?;

    rolling_logger::init_logger(config.log_dir.clone(), "minidot")?;
    rolling_logger::info(&format!("Starting with database {}", config.db_path.display()))?;

    let db = init_db(&config.db_path).await.map_err(|e| e.to_string())?;
    let store = TodoStore::new(Arc::new(SqliteRepository::from_state(&db)), config.store_config());
    store.load_pages().await.map_err(|e| e.to_string())?;

    let now_ms = chrono::Utc::now().timestamp_millis();
    let notified = NotifiedLog::load(&config.notifier.notified_log_path, now_ms);
    let notifier = Notifier::new(store.clone(), LogSink, notified, config.notifier.clone());
    notifier
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await;

    store.settle().await;
    rolling_logger::info("Stopped")?;
    Ok(())
}
