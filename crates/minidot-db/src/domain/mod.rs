//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod page;
mod todo;

pub use entity::{position_of, DomainError, DomainResult, Entity};
pub use page::{next_order, Page};
pub use todo::{insert_newest_first, normalize_text, SearchHit, Todo};
