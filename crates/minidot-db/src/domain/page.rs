//! Page Entity
//!
//! A named, ordered bucket of todos.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A page of todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Opaque unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Position among pages; unique, assigned as max + 1 on creation
    pub order: i64,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order,
        }
    }
}

impl Entity for Page {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Order value for a page appended after `pages`
pub fn next_order<'a>(pages: impl IntoIterator<Item = &'a Page>) -> i64 {
    pages.into_iter().map(|p| p.order).max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_order_empty_is_zero() {
        assert_eq!(next_order(&Vec::<Page>::new()), 0);
    }

    #[test]
    fn test_next_order_uses_max_not_len() {
        let pages = vec![Page::new("a", "A", 0), Page::new("b", "B", 7)];
        assert_eq!(next_order(&pages), 8);
    }
}
