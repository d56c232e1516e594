//! Todo Entity
//!
//! A single task attached to exactly one page.

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};

/// A todo/task item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Opaque unique identifier
    pub id: String,
    /// Trimmed, non-empty text
    pub text: String,
    /// Completion status
    pub done: bool,
    /// Creation time, epoch millis
    pub created_at: i64,
    /// Owning page
    pub page_id: String,
    /// Optional due time, epoch millis
    pub due_date: Option<i64>,
}

impl Todo {
    /// Create a new open todo
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        created_at: i64,
        page_id: impl Into<String>,
        due_date: Option<i64>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            done: false,
            created_at,
            page_id: page_id.into(),
            due_date,
        }
    }
}

impl Entity for Todo {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A search match annotated with the title of its page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub todo: Todo,
    pub page_title: String,
}

/// Trim todo text, rejecting empty or whitespace-only input
pub fn normalize_text(text: &str) -> DomainResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("task text is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Insert keeping `created_at` descending; returns the index used
pub fn insert_newest_first(todos: &mut Vec<Todo>, todo: Todo) -> usize {
    let index = todos
        .iter()
        .position(|t| t.created_at < todo.created_at)
        .unwrap_or(todos.len());
    todos.insert(index, todo);
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_creation() {
        let todo = Todo::new("t1", "Buy milk", 10, "p1", None);
        assert_eq!(todo.id(), "t1");
        assert!(!todo.done);
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  hi  ").unwrap(), "hi");
        assert!(matches!(
            normalize_text(" \t\n"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_insert_newest_first() {
        let mut todos = vec![
            Todo::new("c", "c", 30, "p", None),
            Todo::new("a", "a", 10, "p", None),
        ];
        assert_eq!(insert_newest_first(&mut todos, Todo::new("b", "b", 20, "p", None)), 1);
        assert_eq!(insert_newest_first(&mut todos, Todo::new("d", "d", 40, "p", None)), 0);
        assert_eq!(insert_newest_first(&mut todos, Todo::new("z", "z", 1, "p", None)), 4);
        let ids: Vec<_> = todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["d", "c", "b", "a", "z"]);
    }

    #[test]
    fn test_search_hit_serializes_flat() {
        let hit = SearchHit {
            todo: Todo::new("t1", "foo", 1, "p1", Some(5)),
            page_title: "Work".into(),
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["pageTitle"], "Work");
        assert_eq!(json["pageId"], "p1");
        assert_eq!(json["dueDate"], 5);
    }
}
