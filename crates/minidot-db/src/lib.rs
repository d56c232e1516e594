//! Minidot Storage
//!
//! Layered architecture:
//! - domain: Core entities and error type
//! - repository: The persistence port and its SQLite implementation

pub mod domain;
pub mod repository;

pub use domain::{
    insert_newest_first, next_order, normalize_text, position_of, DomainError, DomainResult,
    Entity, Page, SearchHit, Todo,
};
pub use repository::{
    init_db, DbState, PageRepository, PersistencePort, SqliteRepository, TodoRepository,
};
