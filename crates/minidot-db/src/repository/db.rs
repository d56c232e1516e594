//! Database Connection and Setup
//!
//! Manages the SQLite connection and schema creation.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::DomainResult;

/// Title of the page seeded into an empty database
pub const DEFAULT_PAGE_TITLE: &str = "Tasks";

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    pub conn: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Get a shared handle to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Open the database at `db_path` (":memory:" for a private in-memory db)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    log::info!("[DB] Loading database at {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && db_path != Path::new(":memory:") {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(db_path)?;
    create_schema(&conn)?;
    seed_default_page(&conn)?;
    log::info!("[DB] Database loaded successfully");

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
    })
}

/// Create tables if they don't exist
fn create_schema(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS pages (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            order_num INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            done INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            page_id TEXT NOT NULL,
            due_date INTEGER DEFAULT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_todos_page ON todos(page_id);",
    )?;
    Ok(())
}

/// Insert the landing page when the database has no pages
fn seed_default_page(conn: &Connection) -> DomainResult<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
    if count == 0 {
        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO pages (id, title, order_num) VALUES (?1, ?2, 0)",
            params![id, DEFAULT_PAGE_TITLE],
        )?;
        log::info!("[DB] Default '{}' page created with id {}", DEFAULT_PAGE_TITLE, id);
    }
    Ok(())
}
