//! Page Repository
//!
//! Page CRUD against the `pages` table.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Page};
use super::sqlite_repo::{expect_changed, SqliteRepository};
use super::traits::PageRepository;

#[async_trait]
impl PageRepository for SqliteRepository {
    async fn list_pages(&self) -> DomainResult<Vec<Page>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare("SELECT id, title, order_num FROM pages ORDER BY order_num ASC")?;
        let pages = stmt
            .query_map([], |row| Ok(Page::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("[DB] list_pages returning {} pages", pages.len());
        Ok(pages)
    }

    async fn create_page(&self, title: &str) -> DomainResult<Page> {
        let conn = self.conn.lock().await;

        let order: i64 = conn.query_row(
            "SELECT COALESCE(MAX(order_num), -1) + 1 FROM pages",
            [],
            |row| row.get(0),
        )?;
        let id = uuid::Uuid::new_v4().to_string();
        conn.execute(
            "INSERT INTO pages (id, title, order_num) VALUES (?1, ?2, ?3)",
            params![id, title, order],
        )?;

        log::debug!("[DB] Page {} created with order {}", id, order);
        Ok(Page::new(id, title, order))
    }

    async fn rename_page(&self, id: &str, title: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute("UPDATE pages SET title = ?1 WHERE id = ?2", params![title, id])?;
        log::debug!("[DB] rename_page({}) changed {} rows", id, changed);
        expect_changed(changed, "page", id)
    }

    async fn delete_page(&self, id: &str) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;

        // Manual cascade: todos first, then the page
        let tx = conn.transaction()?;
        let todos = tx.execute("DELETE FROM todos WHERE page_id = ?1", params![id])?;
        let changed = tx.execute("DELETE FROM pages WHERE id = ?1", params![id])?;
        tx.commit()?;

        log::debug!("[DB] Page {} deleted with {} todos", id, todos);
        expect_changed(changed, "page", id)
    }
}
