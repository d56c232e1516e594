//! Selection/edit cursor over the active page's todos.

/// Highlighted index plus the todo under inline edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    selected: Option<usize>,
    editing: Option<String>,
}

impl Cursor {
    /// Selected index, `-1` when nothing is selected
    pub fn selected_index(&self) -> isize {
        self.selected.map_or(-1, |i| i as isize)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Forget selection and edit state (every page change)
    pub fn reset(&mut self) {
        self.selected = None;
        self.editing = None;
    }

    /// Move down; from no selection lands on 0, clamps at the end
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None => 0,
            Some(i) => (i + 1).min(len - 1),
        });
    }

    /// Move up; from no selection lands on the last index, clamps at 0
    pub fn select_prev(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None => len - 1,
            Some(i) => i.saturating_sub(1).min(len - 1),
        });
    }

    /// Set directly; negative clears, too-large clamps
    pub fn set_selected(&mut self, index: isize, len: usize) {
        self.selected = if index < 0 || len == 0 {
            None
        } else {
            Some((index as usize).min(len - 1))
        };
    }

    /// Re-clamp after the list shrank
    pub fn clamp(&mut self, len: usize) {
        if let Some(i) = self.selected {
            self.selected = if len == 0 { None } else { Some(i.min(len - 1)) };
        }
    }

    pub fn set_editing(&mut self, id: Option<String>) {
        self.editing = id;
    }

    /// Start editing `id` unless another todo is already being edited
    pub fn begin_edit(&mut self, id: &str) -> bool {
        match &self.editing {
            Some(current) if current != id => false,
            _ => {
                self.editing = Some(id.to_string());
                true
            }
        }
    }

    /// Drop edit mode if it targets `id`
    pub fn clear_editing_if(&mut self, id: &str) {
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collection_is_noop() {
        let mut cursor = Cursor::default();
        cursor.select_next(0);
        assert_eq!(cursor.selected_index(), -1);
        cursor.select_prev(0);
        assert_eq!(cursor.selected_index(), -1);
    }

    #[test]
    fn test_single_item_converges_to_zero() {
        let mut down = Cursor::default();
        down.select_next(1);
        down.select_next(1);
        assert_eq!(down.selected_index(), 0);

        let mut up = Cursor::default();
        up.select_prev(1);
        up.select_prev(1);
        assert_eq!(up.selected_index(), 0);
    }

    #[test]
    fn test_entry_points_and_clamping() {
        let mut cursor = Cursor::default();
        cursor.select_prev(3);
        assert_eq!(cursor.selected(), Some(2));
        cursor.select_next(3);
        assert_eq!(cursor.selected(), Some(2));

        cursor.reset();
        cursor.select_next(3);
        assert_eq!(cursor.selected(), Some(0));
        cursor.select_prev(3);
        assert_eq!(cursor.selected(), Some(0));
    }

    #[test]
    fn test_set_selected_bounds() {
        let mut cursor = Cursor::default();
        cursor.set_selected(10, 3);
        assert_eq!(cursor.selected(), Some(2));
        cursor.set_selected(-5, 3);
        assert_eq!(cursor.selected_index(), -1);
        cursor.set_selected(0, 0);
        assert_eq!(cursor.selected(), None);
    }

    #[test]
    fn test_clamp_after_removal() {
        let mut cursor = Cursor::default();
        cursor.set_selected(2, 3);
        cursor.clamp(2);
        assert_eq!(cursor.selected(), Some(1));
        cursor.clamp(0);
        assert_eq!(cursor.selected(), None);
    }

    #[test]
    fn test_edit_conflict() {
        let mut cursor = Cursor::default();
        assert!(cursor.begin_edit("a"));
        assert!(!cursor.begin_edit("b"));
        assert!(cursor.begin_edit("a"));

        cursor.clear_editing_if("b");
        assert_eq!(cursor.editing(), Some("a"));
        cursor.clear_editing_if("a");
        assert_eq!(cursor.editing(), None);
    }
}
