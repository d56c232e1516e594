//! Page navigation and page CRUD.

use tokio::sync::watch;

use minidot_db::{next_order, DomainError, DomainResult, Page};

use super::{Creation, PageSlot, PageSync, SlotKey, TodoStore};

/// Trim a page title, rejecting empty input
fn page_title(title: &str) -> DomainResult<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("page title is empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// What a navigation step left to do once the state lock is released
enum Nav {
    Stay,
    /// The active page changed; `removed` was pruned on the way
    Moved { removed: Option<PageSlot> },
    /// A new page is shown and must still be persisted
    Created {
        key: SlotKey,
        title: String,
        done: watch::Sender<Creation>,
    },
}

impl TodoStore {
    /// Advance to the next page.
    ///
    /// On the last page this creates a page if the current one has todos,
    /// or prunes the current one if it is empty (the first page excepted).
    /// Elsewhere an empty current page is pruned in passing.
    pub async fn next_page(&self) -> DomainResult<()> {
        let nav = {
            let mut state = self.state().await;
            if state.pages.is_empty() {
                return Ok(());
            }
            let index = state.current_index;
            let is_last = index + 1 == state.pages.len();
            let is_empty = state.current_is_empty();

            if is_last && !state.is_loaded() {
                // Whether to create or prune depends on todos still loading
                log::debug!("next_page: last page is not loaded yet");
                return Ok(());
            }

            if is_last && !is_empty {
                let key = state.alloc_key();
                let title = format!("Page {}", state.pages.len() + 1);
                let order = next_order(state.pages.iter().map(|slot| &slot.page));
                let (done, pending) = watch::channel(Creation::InFlight);
                state.pages.push(PageSlot {
                    key,
                    page: Page::new(format!("local-{}", key.0), title.clone(), order),
                    sync: PageSync::Pending(pending),
                });
                state.current_index = state.pages.len() - 1;
                state.page_changed();
                // A fresh page has nothing to load
                state.loaded_for = Some(key);
                Nav::Created { key, title, done }
            } else if is_last && index == 0 {
                Nav::Stay
            } else if is_last {
                let removed = state.pages.remove(index);
                state.current_index = index - 1;
                state.page_changed();
                Nav::Moved {
                    removed: Some(removed),
                }
            } else if is_empty && index > 0 {
                // The following page slides into this index
                let removed = state.pages.remove(index);
                state.page_changed();
                Nav::Moved {
                    removed: Some(removed),
                }
            } else {
                state.current_index = index + 1;
                state.page_changed();
                Nav::Moved { removed: None }
            }
        };
        self.finish_navigation(nav).await
    }

    /// Step back one page, pruning the current page if it is empty
    pub async fn prev_page(&self) -> DomainResult<()> {
        let nav = {
            let mut state = self.state().await;
            let index = state.current_index;
            if state.pages.is_empty() || index == 0 {
                Nav::Stay
            } else {
                let removed = state
                    .current_is_empty()
                    .then(|| state.pages.remove(index));
                state.current_index = index - 1;
                state.page_changed();
                Nav::Moved { removed }
            }
        };
        self.finish_navigation(nav).await
    }

    /// Make `page_id` the active page
    pub async fn go_to_page(&self, page_id: &str) -> DomainResult<()> {
        {
            let mut state = self.state().await;
            let Some(index) = state.index_of_page(page_id) else {
                log::debug!("go_to_page: no page {}", page_id);
                return Ok(());
            };
            state.current_index = index;
            state.page_changed();
        }
        self.reload_todos().await
    }

    async fn finish_navigation(&self, nav: Nav) -> DomainResult<()> {
        match nav {
            Nav::Stay => Ok(()),
            Nav::Moved { removed } => {
                if let Some(slot) = removed {
                    self.discard_slot(slot).await;
                }
                self.reload_todos().await
            }
            Nav::Created { key, title, done } => {
                let store = self.clone();
                self.spawn_background(async move {
                    store.persist_new_page(key, title, done).await;
                })
                .await;
                Ok(())
            }
        }
    }

    /// Delete the stored page behind a pruned slot
    async fn discard_slot(&self, slot: PageSlot) {
        let PageSync::Persisted = slot.sync else {
            // A pending creation cleans up after itself once it sees the slot is gone
            log::debug!("Pruned unsaved page {}", slot.page.title);
            return;
        };
        log::info!("Pruning empty page {}", slot.page.id);
        let store = self.clone();
        self.spawn_background(async move {
            match store.port().delete_page(&slot.page.id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    store.report(e, "Failed to delete page").await;
                }
            }
        })
        .await;
    }

    /// Background half of page creation from `next_page`
    async fn persist_new_page(&self, key: SlotKey, title: String, done: watch::Sender<Creation>) {
        let _gate = self.inner.creation_gate.lock().await;
        let outcome = match self.port().create_page(&title).await {
            Ok(created) => {
                let reconciled = {
                    let mut state = self.state().await;
                    match state.slot_mut(key) {
                        Some(slot) => {
                            let local_title = std::mem::replace(&mut slot.page, created.clone()).title;
                            slot.page.title = local_title.clone();
                            slot.sync = PageSync::Persisted;
                            Some(local_title)
                        }
                        None => None,
                    }
                };
                match reconciled {
                    // Renamed while the creation was in flight
                    Some(local_title) if local_title != created.title => {
                        if let Err(e) = self.port().rename_page(&created.id, &local_title).await {
                            self.report(e, "Failed to update title").await;
                        }
                    }
                    Some(_) => {}
                    None => {
                        log::info!("Page {} was pruned before it was saved, deleting", created.id);
                        if let Err(e) = self.port().delete_page(&created.id).await {
                            log::warn!("Failed to delete orphaned page {}: {}", created.id, e);
                        }
                    }
                }
                Creation::Created
            }
            Err(e) => {
                {
                    let mut state = self.state().await;
                    if let Some(slot) = state.slot_mut(key) {
                        slot.sync = PageSync::LocalOnly;
                    }
                }
                self.report(e, "Failed to create page").await;
                Creation::Failed
            }
        };
        done.send_replace(outcome);
    }

    /// Create a page after all others and return it; the active page is unchanged
    pub async fn add_page(&self, title: &str) -> DomainResult<Page> {
        let title = page_title(title)?;
        let _gate = self.inner.creation_gate.lock().await;
        match self.port().create_page(&title).await {
            Ok(page) => {
                let mut state = self.state().await;
                let key = state.alloc_key();
                state.pages.push(PageSlot::persisted(key, page.clone()));
                Ok(page)
            }
            Err(e) => Err(self.report(e, "Failed to create page").await),
        }
    }

    pub async fn rename_page(&self, page_id: &str, title: &str) -> DomainResult<()> {
        let title = page_title(title)?;
        let (key, stored_id) = {
            let mut state = self.state().await;
            let Some(index) = state.index_of_page(page_id) else {
                log::debug!("rename_page: no page {}", page_id);
                return Ok(());
            };
            let slot = &mut state.pages[index];
            if slot.page.title == title {
                return Ok(());
            }
            match slot.persisted_id().map(str::to_string) {
                Some(id) => (slot.key, id),
                None => {
                    // Picked up when the pending creation resolves
                    slot.page.title = title;
                    return Ok(());
                }
            }
        };

        match self.port().rename_page(&stored_id, &title).await {
            Ok(()) => {
                if let Some(slot) = self.state().await.slot_mut(key) {
                    slot.page.title = title;
                }
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                log::debug!("rename_page: {} is gone", stored_id);
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to update title").await),
        }
    }

    /// Delete a page and its todos, keeping the active page where possible
    pub async fn delete_page(&self, page_id: &str) -> DomainResult<()> {
        let (key, stored_id) = {
            let state = self.state().await;
            let Some(index) = state.index_of_page(page_id) else {
                log::debug!("delete_page: no page {}", page_id);
                return Ok(());
            };
            let slot = &state.pages[index];
            (slot.key, slot.persisted_id().map(str::to_string))
        };

        if let Some(id) = stored_id {
            match self.port().delete_page(&id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(self.report(e, "Failed to delete page").await),
            }
        }

        let active_changed = {
            let mut state = self.state().await;
            let Some(index) = state.index_of_key(key) else {
                return Ok(());
            };
            let before = state.current_key();
            state.pages.remove(index);
            if index < state.current_index {
                state.current_index -= 1;
            }
            if state.current_index >= state.pages.len() {
                state.current_index = state.pages.len().saturating_sub(1);
            }
            let changed = state.current_key() != before;
            if changed {
                state.page_changed();
            }
            changed
        };
        log::info!("Deleted page {}", page_id);

        if active_changed {
            self.reload_todos().await
        } else {
            Ok(())
        }
    }
}
