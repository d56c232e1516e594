//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use crate::domain::{DomainResult, Page, SearchHit, Todo};

/// Page storage operations
///
/// All operations are async to support various backends.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// All pages ordered by `order` ascending
    async fn list_pages(&self) -> DomainResult<Vec<Page>>;

    /// Create a page placed after every existing page
    async fn create_page(&self, title: &str) -> DomainResult<Page>;

    /// Change a page's title
    async fn rename_page(&self, id: &str, title: &str) -> DomainResult<()>;

    /// Delete a page and every todo on it
    async fn delete_page(&self, id: &str) -> DomainResult<()>;
}

/// Todo storage operations
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Todos of one page, newest first
    async fn list_todos(&self, page_id: &str) -> DomainResult<Vec<Todo>>;

    /// Create an open todo stamped with the current time
    async fn create_todo(&self, text: &str, page_id: &str, due_date: Option<i64>) -> DomainResult<Todo>;

    async fn update_todo_text(&self, id: &str, text: &str) -> DomainResult<()>;

    /// Flip the done flag
    async fn toggle_todo(&self, id: &str) -> DomainResult<()>;

    async fn set_todo_due_date(&self, id: &str, due_date: Option<i64>) -> DomainResult<()>;

    async fn delete_todo(&self, id: &str) -> DomainResult<()>;

    /// Re-insert a deleted todo with its original identity and fields
    async fn restore_todo(&self, todo: &Todo) -> DomainResult<()>;

    /// Case-insensitive substring search across all pages, newest first
    async fn search_todos(&self, query: &str) -> DomainResult<Vec<SearchHit>>;

    /// Open todos due within the next `within_hours`, soonest first
    async fn upcoming_due_todos(&self, within_hours: u32) -> DomainResult<Vec<Todo>>;
}

/// The full storage surface the todo store depends on
pub trait PersistencePort: PageRepository + TodoRepository {}

impl<T: PageRepository + TodoRepository> PersistencePort for T {}
