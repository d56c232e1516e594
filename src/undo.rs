//! Deleted-todo stack for one-at-a-time restoration.

use minidot_db::Todo;

/// LIFO record of deleted todos, independent of the active page
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    entries: Vec<Todo>,
    /// Keep at most this many deletions; `None` keeps everything
    capacity: Option<usize>,
}

impl UndoStack {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Record a deletion, dropping the oldest entries past capacity
    pub fn push(&mut self, todo: Todo) {
        self.entries.push(todo);
        if let Some(limit) = self.capacity {
            if self.entries.len() > limit {
                self.entries.drain(..self.entries.len() - limit);
            }
        }
    }

    /// The todo the next undo restores
    pub fn peek(&self) -> Option<&Todo> {
        self.entries.last()
    }

    /// Remove the entry for `id` wherever it sits
    ///
    /// Two overlapping undos may both restore the same top entry; only the
    /// first to finish removes it and the second finds nothing.
    pub fn remove(&mut self, id: &str) -> Option<Todo> {
        let index = self.entries.iter().rposition(|t| t.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str) -> Todo {
        Todo::new(id, id, 0, "p", None)
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = UndoStack::new(None);
        stack.push(todo("t1"));
        stack.push(todo("t2"));

        assert_eq!(stack.peek().map(|t| t.id.as_str()), Some("t2"));
        stack.remove("t2");
        assert_eq!(stack.peek().map(|t| t.id.as_str()), Some("t1"));
        stack.remove("t1");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut stack = UndoStack::default();
        for i in 0..1000 {
            stack.push(todo(&i.to_string()));
        }
        assert_eq!(stack.len(), 1000);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut stack = UndoStack::new(Some(2));
        stack.push(todo("a"));
        stack.push(todo("b"));
        stack.push(todo("c"));

        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek().map(|t| t.id.as_str()), Some("c"));
        assert!(stack.remove("a").is_none());
        assert_eq!(stack.remove("b").map(|t| t.id), Some("b".to_string()));
    }

    #[test]
    fn test_remove_by_id() {
        let mut stack = UndoStack::new(None);
        stack.push(todo("a"));
        stack.push(todo("b"));

        assert_eq!(stack.remove("a").unwrap().id, "a");
        assert!(stack.remove("a").is_none());
        assert_eq!(stack.peek().unwrap().id, "b");
    }
}
