//! SQLite Repository
//!
//! SQLite-backed implementation of the persistence port.
//! Trait impls are split by entity:
//! - page_repo: PageRepository
//! - todo_repo: TodoRepository

use rusqlite::{Connection, Row};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Todo};
use super::db::DbState;

/// Columns selected for every todo query, in `row_to_todo` order
pub(super) const TODO_COLUMNS: &str = "id, text, done, created_at, page_id, due_date";

/// SQLite implementation of the page and todo repositories
#[derive(Clone)]
pub struct SqliteRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn from_state(state: &DbState) -> Self {
        Self::new(state.connection())
    }
}

/// Map a row selected with `TODO_COLUMNS`
pub(super) fn row_to_todo(row: &Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        text: row.get(1)?,
        done: row.get::<_, i64>(2)? != 0,
        created_at: row.get(3)?,
        page_id: row.get(4)?,
        due_date: row.get(5)?,
    })
}

/// Turn "0 rows changed" into NotFound
pub(super) fn expect_changed(changed: usize, what: &str, id: &str) -> DomainResult<()> {
    if changed == 0 {
        return Err(DomainError::NotFound(format!("{} {}", what, id)));
    }
    Ok(())
}

pub(super) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
