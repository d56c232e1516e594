//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// Returns the entity's unique identifier
    fn id(&self) -> &str;
}

/// Position of the entity with the given id, if present
pub fn position_of<T: Entity>(entities: &[T], id: &str) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    /// Input rejected before reaching storage (empty text, bad config)
    Validation(String),
    /// The storage layer failed
    Persistence(String),
    /// A referenced entity no longer exists
    NotFound(String),
}

impl DomainError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::Persistence(msg) => write!(f, "Storage error: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<rusqlite::Error> for DomainError {
    fn from(value: rusqlite::Error) -> Self {
        DomainError::Persistence(value.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(value: std::io::Error) -> Self {
        DomainError::Persistence(value.to_string())
    }
}
