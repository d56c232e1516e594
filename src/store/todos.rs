//! Todo CRUD, undo, search and the selection cursor.

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::watch;

use minidot_db::{normalize_text, position_of, DomainError, DomainResult, SearchHit, Todo};

use super::{Creation, PageSync, SlotKey, TodoStore};
use crate::notifier::DueSource;

/// Where a new todo goes, as seen before any waiting
enum Target {
    Ready(SlotKey, String),
    Pending(SlotKey, watch::Receiver<Creation>),
    Unsaved,
}

impl TodoStore {
    /// Add a todo to the active page.
    ///
    /// If that page is still being created this waits for the creation to
    /// resolve. Returns `None` when the page was pruned in the meantime.
    pub async fn add_todo(&self, text: &str, due_date: Option<i64>) -> DomainResult<Option<Todo>> {
        let text = normalize_text(text)?;
        let target = {
            let state = self.state().await;
            state.current().map(|slot| match &slot.sync {
                PageSync::Persisted => Target::Ready(slot.key, slot.page.id.clone()),
                PageSync::Pending(pending) => Target::Pending(slot.key, pending.clone()),
                PageSync::LocalOnly => Target::Unsaved,
            })
        };

        let (key, page_id) = match target {
            None => {
                let err = DomainError::Validation("no page selected".to_string());
                return Err(self.report(err, "No page selected").await);
            }
            Some(Target::Ready(key, page_id)) => (key, page_id),
            Some(Target::Pending(key, mut pending)) => {
                // The sender always publishes before it is dropped
                let _ = pending.wait_for(|c| *c != Creation::InFlight).await;
                let resolved = {
                    let state = self.state().await;
                    state
                        .slot(key)
                        .map(|slot| slot.persisted_id().map(str::to_string))
                };
                match resolved {
                    None => {
                        log::debug!("add_todo: page was removed while being created");
                        return Ok(None);
                    }
                    Some(Some(page_id)) => (key, page_id),
                    Some(None) => {
                        let err = DomainError::Persistence("page was never saved".to_string());
                        return Err(self.report(err, "Failed to add task").await);
                    }
                }
            }
            Some(Target::Unsaved) => {
                let err = DomainError::Persistence("page was never saved".to_string());
                return Err(self.report(err, "Failed to add task").await);
            }
        };

        match self.port().create_todo(&text, &page_id, due_date).await {
            Ok(todo) => {
                let mut state = self.state().await;
                if state.loaded_for == Some(key) {
                    state.todos.insert(0, todo.clone());
                } else {
                    state.place_written(key, todo.clone());
                }
                Ok(Some(todo))
            }
            Err(e) => Err(self.report(e, "Failed to add task").await),
        }
    }

    async fn holds(&self, id: &str) -> Option<Todo> {
        let state = self.state().await;
        position_of(&state.todos, id).map(|i| state.todos[i].clone())
    }

    /// Persist one change to a held todo, then mirror it in memory.
    /// Unknown ids and todos already gone from storage are ignored.
    async fn write_todo<W>(
        &self,
        id: &str,
        failure: &str,
        write: W,
        apply: impl FnOnce(&mut Todo),
    ) -> DomainResult<()>
    where
        W: Future<Output = DomainResult<()>>,
    {
        if self.holds(id).await.is_none() {
            log::debug!("No todo {} on the active page", id);
            return Ok(());
        }
        match write.await {
            Ok(()) => {
                let mut state = self.state().await;
                if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
                    apply(todo);
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                log::debug!("Todo {} is gone from storage", id);
                Ok(())
            }
            Err(e) => Err(self.report(e, failure).await),
        }
    }

    pub async fn toggle_todo(&self, id: &str) -> DomainResult<()> {
        self.write_todo(id, "Failed to update task", self.port().toggle_todo(id), |todo| {
            todo.done = !todo.done
        })
        .await
    }

    pub async fn update_todo_text(&self, id: &str, text: &str) -> DomainResult<()> {
        let text = normalize_text(text)?;
        if self.holds(id).await.is_some_and(|todo| todo.text == text) {
            return Ok(());
        }
        let updated = text.clone();
        self.write_todo(
            id,
            "Failed to update task",
            self.port().update_todo_text(id, &text),
            move |todo| todo.text = updated,
        )
        .await
    }

    /// Set or clear (`None`) the due date
    pub async fn set_due_date(&self, id: &str, due_date: Option<i64>) -> DomainResult<()> {
        self.write_todo(
            id,
            "Failed to update due date",
            self.port().set_todo_due_date(id, due_date),
            move |todo| todo.due_date = due_date,
        )
        .await
    }

    /// Delete a todo and make it the next one `undo_delete` restores
    pub async fn delete_todo(&self, id: &str) -> DomainResult<()> {
        let Some(todo) = self.holds(id).await else {
            log::debug!("delete_todo: no todo {} on the active page", id);
            return Ok(());
        };
        match self.port().delete_todo(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::debug!("delete_todo: {} is gone from storage", id);
                return Ok(());
            }
            Err(e) => return Err(self.report(e, "Failed to delete task").await),
        }

        let mut state = self.state().await;
        if let Some(index) = position_of(&state.todos, id) {
            state.todos.remove(index);
        }
        let len = state.todos.len();
        state.cursor.clamp(len);
        state.cursor.clear_editing_if(id);
        state.undo.push(todo.clone());
        state.last_deleted.show(todo);
        Ok(())
    }

    /// Restore the most recently deleted todo, whatever page it was on
    pub async fn undo_delete(&self) -> DomainResult<Option<Todo>> {
        let Some(todo) = self.state().await.undo.peek().cloned() else {
            return Ok(None);
        };
        if let Err(e) = self.port().restore_todo(&todo).await {
            // Left on the stack so the user can retry
            return Err(self.report(e, "Failed to restore task").await);
        }

        let mut state = self.state().await;
        state.undo.remove(&todo.id);
        state.last_deleted.clear();
        let active = state
            .current()
            .filter(|slot| slot.persisted_id() == Some(todo.page_id.as_str()))
            .map(|slot| slot.key);
        if let Some(key) = active {
            state.place_written(key, todo.clone());
        }
        log::info!("Restored todo {}", todo.id);
        Ok(Some(todo))
    }

    /// Dismiss the "undo available" hint; the undo stack is untouched
    pub async fn clear_last_deleted(&self) {
        self.state().await.last_deleted.clear();
    }

    /// Search all pages. Blank queries match nothing.
    pub async fn search(&self, query: &str) -> DomainResult<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        match self.port().search_todos(query).await {
            Ok(hits) => Ok(hits),
            Err(e) => Err(self.report(e, "Failed to search").await),
        }
    }

    pub async fn select_next(&self) {
        let mut state = self.state().await;
        let len = state.todos.len();
        state.cursor.select_next(len);
    }

    pub async fn select_prev(&self) {
        let mut state = self.state().await;
        let len = state.todos.len();
        state.cursor.select_prev(len);
    }

    /// Select by index; `-1` clears the selection
    pub async fn set_selected_index(&self, index: isize) {
        let mut state = self.state().await;
        let len = state.todos.len();
        state.cursor.set_selected(index, len);
    }

    /// Enter edit mode for `id`, or leave it with `None`
    pub async fn set_editing(&self, id: Option<&str>) {
        let mut state = self.state().await;
        match id {
            None => state.cursor.set_editing(None),
            Some(id) if position_of(&state.todos, id).is_some() => {
                state.cursor.set_editing(Some(id.to_string()))
            }
            Some(id) => log::debug!("set_editing: no todo {}", id),
        }
    }

    async fn selected_id(&self) -> Option<String> {
        let state = self.state().await;
        let index = state.cursor.selected()?;
        state.todos.get(index).map(|todo| todo.id.clone())
    }

    /// Start editing the selected todo; false if nothing is selected or
    /// another todo is being edited
    pub async fn edit_selected(&self) -> bool {
        let mut state = self.state().await;
        let Some(id) = state
            .cursor
            .selected()
            .and_then(|i| state.todos.get(i))
            .map(|todo| todo.id.clone())
        else {
            return false;
        };
        state.cursor.begin_edit(&id)
    }

    /// Save the edited text and leave edit mode. Blank text discards the edit.
    pub async fn commit_edit(&self, text: &str) -> DomainResult<()> {
        let Some(id) = self.state().await.cursor.editing().map(str::to_string) else {
            return Ok(());
        };
        let result = if text.trim().is_empty() {
            Ok(())
        } else {
            self.update_todo_text(&id, text).await
        };
        self.state().await.cursor.clear_editing_if(&id);
        result
    }

    pub async fn toggle_selected(&self) -> DomainResult<()> {
        match self.selected_id().await {
            Some(id) => self.toggle_todo(&id).await,
            None => Ok(()),
        }
    }

    pub async fn delete_selected(&self) -> DomainResult<()> {
        match self.selected_id().await {
            Some(id) => self.delete_todo(&id).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DueSource for TodoStore {
    async fn upcoming_due_todos(&self, within_hours: u32) -> DomainResult<Vec<Todo>> {
        self.port().upcoming_due_todos(within_hours).await
    }
}
