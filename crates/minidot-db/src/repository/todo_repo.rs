//! Todo Repository
//!
//! Todo CRUD, search and due-date queries against the `todos` table.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, SearchHit, Todo};
use super::sqlite_repo::{expect_changed, now_millis, row_to_todo, SqliteRepository, TODO_COLUMNS};
use super::traits::TodoRepository;

const HOUR_MS: i64 = 60 * 60 * 1000;

#[async_trait]
impl TodoRepository for SqliteRepository {
    async fn list_todos(&self, page_id: &str) -> DomainResult<Vec<Todo>> {
        let conn = self.conn.lock().await;

        let query = format!(
            "SELECT {} FROM todos WHERE page_id = ?1 ORDER BY created_at DESC, rowid DESC",
            TODO_COLUMNS
        );
        let mut stmt = conn.prepare(&query)?;
        let todos = stmt
            .query_map(params![page_id], row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("[DB] list_todos({}) returning {} todos", page_id, todos.len());
        Ok(todos)
    }

    async fn create_todo(&self, text: &str, page_id: &str, due_date: Option<i64>) -> DomainResult<Todo> {
        let conn = self.conn.lock().await;

        let todo = Todo::new(uuid::Uuid::new_v4().to_string(), text, now_millis(), page_id, due_date);
        conn.execute(
            "INSERT INTO todos (id, text, done, created_at, page_id, due_date) VALUES (?1, ?2, 0, ?3, ?4, ?5)",
            params![todo.id, todo.text, todo.created_at, todo.page_id, todo.due_date],
        )?;

        log::debug!("[DB] Todo {} created on page {}", todo.id, page_id);
        Ok(todo)
    }

    async fn update_todo_text(&self, id: &str, text: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute("UPDATE todos SET text = ?1 WHERE id = ?2", params![text, id])?;
        log::debug!("[DB] update_todo_text({}) changed {} rows", id, changed);
        expect_changed(changed, "todo", id)
    }

    async fn toggle_todo(&self, id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute(
            "UPDATE todos SET done = CASE done WHEN 0 THEN 1 ELSE 0 END WHERE id = ?1",
            params![id],
        )?;
        log::debug!("[DB] toggle_todo({}) changed {} rows", id, changed);
        expect_changed(changed, "todo", id)
    }

    async fn set_todo_due_date(&self, id: &str, due_date: Option<i64>) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute("UPDATE todos SET due_date = ?1 WHERE id = ?2", params![due_date, id])?;
        log::debug!("[DB] set_todo_due_date({}, {:?}) changed {} rows", id, due_date, changed);
        expect_changed(changed, "todo", id)
    }

    async fn delete_todo(&self, id: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute("DELETE FROM todos WHERE id = ?1", params![id])?;
        log::debug!("[DB] delete_todo({}) changed {} rows", id, changed);
        expect_changed(changed, "todo", id)
    }

    async fn restore_todo(&self, todo: &Todo) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT OR REPLACE INTO todos (id, text, done, created_at, page_id, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                todo.id,
                todo.text,
                if todo.done { 1 } else { 0 },
                todo.created_at,
                todo.page_id,
                todo.due_date
            ],
        )?;
        log::debug!("[DB] Todo {} restored on page {}", todo.id, todo.page_id);
        Ok(())
    }

    async fn search_todos(&self, query: &str) -> DomainResult<Vec<SearchHit>> {
        let conn = self.conn.lock().await;

        // LIKE only folds ASCII case, so it narrows rows for ASCII queries and
        // the lowercase comparison below decides
        let pattern = if query.is_ascii() {
            format!("%{}%", escape_like(query))
        } else {
            "%".to_string()
        };
        let needle = query.to_lowercase();
        let mut stmt = conn.prepare(
            "SELECT t.id, t.text, t.done, t.created_at, t.page_id, t.due_date, p.title
             FROM todos t
             JOIN pages p ON t.page_id = p.id
             WHERE t.text LIKE ?1 ESCAPE '\\'
             ORDER BY t.created_at DESC, t.rowid DESC",
        )?;
        let rows = stmt.query_map(params![pattern], |row| {
            Ok(SearchHit {
                todo: row_to_todo(row)?,
                page_title: row.get(6)?,
            })
        })?;

        let mut hits = Vec::new();
        for hit in rows {
            let hit = hit?;
            if hit.todo.text.to_lowercase().contains(&needle) {
                hits.push(hit);
            }
        }
        log::debug!("[DB] search_todos({:?}) returning {} hits", query, hits.len());
        Ok(hits)
    }

    async fn upcoming_due_todos(&self, within_hours: u32) -> DomainResult<Vec<Todo>> {
        let conn = self.conn.lock().await;

        let now = now_millis();
        let until = now + i64::from(within_hours) * HOUR_MS;
        let query = format!(
            "SELECT {} FROM todos
             WHERE due_date IS NOT NULL AND due_date > ?1 AND due_date <= ?2 AND done = 0
             ORDER BY due_date ASC",
            TODO_COLUMNS
        );
        let mut stmt = conn.prepare(&query)?;
        let todos = stmt
            .query_map(params![now, until], row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("[DB] upcoming_due_todos({}h) returning {} todos", within_hours, todos.len());
        Ok(todos)
    }
}

/// Escape LIKE wildcards so they match literally under `ESCAPE '\\'`
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
