//! Keyboard chords to store intents.
//!
//! Resolution is pure; [`TodoStore::dispatch`] executes the result. Intents
//! that concern the window or modals are handed back to the presenter.

use serde::{Deserialize, Serialize};

use minidot_db::DomainResult;

use crate::models::Snapshot;
use crate::store::TodoStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

/// `command` is Cmd on macOS and Ctrl elsewhere
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub command: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPress {
    pub key: Key,
    pub mods: Modifiers,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            mods: Modifiers::default(),
        }
    }

    pub fn command(key: Key) -> Self {
        Self {
            key,
            mods: Modifiers {
                command: true,
                ..Modifiers::default()
            },
        }
    }

    pub fn alt(key: Key) -> Self {
        Self {
            key,
            mods: Modifiers {
                alt: true,
                ..Modifiers::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    NextPage,
    PrevPage,
    Undo,
    ToggleSelected,
    EditSelected,
    DeleteSelected,
    SelectNext,
    SelectPrev,
    /// Leave the input for the first todo
    SelectFirst,
    /// Leave the input for the last todo
    SelectLast,
    /// Clear the selection and return focus to the input
    FocusInput,
    Hide,
    OpenSearch,
    OpenHelp,
    OpenSettings,
}

/// What the presenter knows when a key arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyContext {
    pub input_focused: bool,
    pub editing: bool,
    pub selected_index: isize,
    pub todo_count: usize,
}

impl KeyContext {
    pub fn from_snapshot(snapshot: &Snapshot, input_focused: bool) -> Self {
        Self {
            input_focused,
            editing: snapshot.editing_id.is_some(),
            selected_index: snapshot.selected_index,
            todo_count: snapshot.todos.len(),
        }
    }
}

fn is_char(key: Key, c: char) -> bool {
    matches!(key, Key::Char(k) if k.to_ascii_lowercase() == c)
}

/// Map a chord to an intent; `None` leaves the key to the focused widget
pub fn resolve(press: &KeyPress, ctx: &KeyContext) -> Option<Intent> {
    let KeyPress { key, mods } = *press;
    let last = ctx.todo_count as isize - 1;

    if key == Key::Escape {
        return Some(Intent::Hide);
    }
    if mods.command && !mods.shift && is_char(key, 'z') {
        return Some(Intent::Undo);
    }
    if mods.alt {
        match key {
            Key::Left => return Some(Intent::PrevPage),
            Key::Right => return Some(Intent::NextPage),
            _ => {}
        }
    }
    if mods.command {
        if key == Key::Enter {
            return Some(Intent::ToggleSelected);
        }
        if is_char(key, 'f') {
            return Some(Intent::OpenSearch);
        }
        if is_char(key, '/') {
            return Some(Intent::OpenHelp);
        }
        if is_char(key, ',') {
            return Some(Intent::OpenSettings);
        }
    }

    match key {
        Key::Enter if !ctx.input_focused && !ctx.editing && ctx.selected_index >= 0 => {
            Some(Intent::EditSelected)
        }
        Key::Up if ctx.input_focused => (ctx.todo_count > 0).then_some(Intent::SelectLast),
        Key::Up if ctx.selected_index <= 0 => Some(Intent::FocusInput),
        Key::Up => Some(Intent::SelectPrev),
        Key::Down if ctx.input_focused => (ctx.todo_count > 0).then_some(Intent::SelectFirst),
        Key::Down if ctx.selected_index >= last => Some(Intent::FocusInput),
        Key::Down => Some(Intent::SelectNext),
        Key::Backspace | Key::Delete if !ctx.input_focused => Some(Intent::DeleteSelected),
        _ => None,
    }
}

/// Result of dispatching an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// The presenter must act (focus, window, modal)
    External(Intent),
}

impl TodoStore {
    /// Resolve a key press against the current state and dispatch it.
    /// `None` means the key is not bound here.
    pub async fn handle_key(&self, press: &KeyPress, input_focused: bool) -> DomainResult<Option<Dispatch>> {
        let ctx = KeyContext::from_snapshot(&self.snapshot().await, input_focused);
        match resolve(press, &ctx) {
            Some(intent) => self.dispatch(intent).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn dispatch(&self, intent: Intent) -> DomainResult<Dispatch> {
        match intent {
            Intent::NextPage => self.next_page().await?,
            Intent::PrevPage => self.prev_page().await?,
            Intent::Undo => {
                self.undo_delete().await?;
            }
            Intent::ToggleSelected => self.toggle_selected().await?,
            Intent::EditSelected => {
                self.edit_selected().await;
            }
            Intent::DeleteSelected => self.delete_selected().await?,
            Intent::SelectNext => self.select_next().await,
            Intent::SelectPrev => self.select_prev().await,
            Intent::SelectFirst => self.set_selected_index(0).await,
            Intent::SelectLast => self.set_selected_index(isize::MAX).await,
            Intent::FocusInput => {
                self.set_selected_index(-1).await;
                return Ok(Dispatch::External(intent));
            }
            Intent::Hide | Intent::OpenSearch | Intent::OpenHelp | Intent::OpenSettings => {
                return Ok(Dispatch::External(intent));
            }
        }
        Ok(Dispatch::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(input_focused: bool, selected_index: isize, todo_count: usize) -> KeyContext {
        KeyContext {
            input_focused,
            editing: false,
            selected_index,
            todo_count,
        }
    }

    #[test]
    fn test_global_chords() {
        let c = ctx(true, -1, 3);
        assert_eq!(resolve(&KeyPress::plain(Key::Escape), &c), Some(Intent::Hide));
        assert_eq!(resolve(&KeyPress::command(Key::Char('z')), &c), Some(Intent::Undo));
        assert_eq!(resolve(&KeyPress::alt(Key::Left), &c), Some(Intent::PrevPage));
        assert_eq!(resolve(&KeyPress::alt(Key::Right), &c), Some(Intent::NextPage));
        assert_eq!(resolve(&KeyPress::command(Key::Char('F')), &c), Some(Intent::OpenSearch));
        assert_eq!(resolve(&KeyPress::command(Key::Char('/')), &c), Some(Intent::OpenHelp));
        assert_eq!(resolve(&KeyPress::command(Key::Char(',')), &c), Some(Intent::OpenSettings));
    }

    #[test]
    fn test_shift_z_is_not_undo() {
        let mut press = KeyPress::command(Key::Char('z'));
        press.mods.shift = true;
        assert_eq!(resolve(&press, &ctx(true, -1, 0)), None);
    }

    #[test]
    fn test_arrow_focus_handoff() {
        // From the input
        assert_eq!(resolve(&KeyPress::plain(Key::Down), &ctx(true, -1, 3)), Some(Intent::SelectFirst));
        assert_eq!(resolve(&KeyPress::plain(Key::Up), &ctx(true, -1, 3)), Some(Intent::SelectLast));
        assert_eq!(resolve(&KeyPress::plain(Key::Down), &ctx(true, -1, 0)), None);

        // Off either end of the list
        assert_eq!(resolve(&KeyPress::plain(Key::Down), &ctx(false, 2, 3)), Some(Intent::FocusInput));
        assert_eq!(resolve(&KeyPress::plain(Key::Up), &ctx(false, 0, 3)), Some(Intent::FocusInput));

        assert_eq!(resolve(&KeyPress::plain(Key::Down), &ctx(false, 0, 3)), Some(Intent::SelectNext));
        assert_eq!(resolve(&KeyPress::plain(Key::Up), &ctx(false, 2, 3)), Some(Intent::SelectPrev));
    }

    #[test]
    fn test_enter_and_delete_need_list_focus() {
        assert_eq!(resolve(&KeyPress::plain(Key::Enter), &ctx(false, 1, 3)), Some(Intent::EditSelected));
        assert_eq!(resolve(&KeyPress::plain(Key::Enter), &ctx(true, 1, 3)), None);
        assert_eq!(resolve(&KeyPress::plain(Key::Enter), &ctx(false, -1, 3)), None);

        let mut editing = ctx(false, 1, 3);
        editing.editing = true;
        assert_eq!(resolve(&KeyPress::plain(Key::Enter), &editing), None);

        assert_eq!(resolve(&KeyPress::command(Key::Enter), &ctx(true, 1, 3)), Some(Intent::ToggleSelected));
        assert_eq!(resolve(&KeyPress::plain(Key::Backspace), &ctx(false, 1, 3)), Some(Intent::DeleteSelected));
        assert_eq!(resolve(&KeyPress::plain(Key::Delete), &ctx(true, 1, 3)), None);
    }
}
