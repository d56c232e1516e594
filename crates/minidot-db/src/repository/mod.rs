//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod sqlite_repo;
mod page_repo;
mod todo_repo;


pub use traits::{PageRepository, PersistencePort, TodoRepository};
pub use db::{init_db, DbState, DEFAULT_PAGE_TITLE};
pub use sqlite_repo::SqliteRepository;
