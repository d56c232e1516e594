//! Todo Store
//!
//! Owns the ordered pages, the active page's todos, the undo stack and the
//! selection cursor. Every change is mediated against a [`PersistencePort`].
//!
//! Writes are pessimistic: memory changes only after the port confirms.
//! The one exception is advancing past the last page, which shows the new
//! page immediately and persists it in the background. Such a page lives in
//! a [`PageSlot`] whose [`PageSync`] records that the write is pending.
//!
//! The state lock is never held across a port call.

mod pages;
mod todos;

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use minidot_db::{
    insert_newest_first, position_of, DomainError, DomainResult, Page, PersistencePort, Todo,
};

use crate::config::StoreConfig;
use crate::models::Snapshot;
use crate::selection::Cursor;
use crate::transient::{Toast, ToastKind, Transient};
use crate::undo::UndoStack;

/// Stable identity of a page slot, independent of the page id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey(u64);

/// Outcome of a background page creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Creation {
    InFlight,
    Created,
    Failed,
}

/// Persistence status of a page slot
#[derive(Debug)]
pub(crate) enum PageSync {
    /// The page id is the stored id
    Persisted,
    /// Creation is in flight; resolves to `Created` or `Failed`
    Pending(watch::Receiver<Creation>),
    /// Creation failed, the page exists only in memory
    LocalOnly,
}

#[derive(Debug)]
pub(crate) struct PageSlot {
    pub(crate) key: SlotKey,
    pub(crate) page: Page,
    pub(crate) sync: PageSync,
}

impl PageSlot {
    fn persisted(key: SlotKey, page: Page) -> Self {
        Self {
            key,
            page,
            sync: PageSync::Persisted,
        }
    }

    /// Stored page id, if the page has been persisted
    pub(crate) fn persisted_id(&self) -> Option<&str> {
        match self.sync {
            PageSync::Persisted => Some(&self.page.id),
            _ => None,
        }
    }
}

pub(crate) struct StoreState {
    pub(crate) pages: Vec<PageSlot>,
    pub(crate) current_index: usize,
    /// Todos of the page named by `loaded_for`
    pub(crate) todos: Vec<Todo>,
    pub(crate) loaded_for: Option<SlotKey>,
    /// Todos written to the active page while its load was in flight
    pub(crate) unmerged: Vec<Todo>,
    /// Bumped per load; only the latest load may install its result
    load_token: u64,
    pub(crate) cursor: Cursor,
    pub(crate) undo: UndoStack,
    pub(crate) last_deleted: Transient<Todo>,
    pub(crate) toast: Transient<Toast>,
    next_key: u64,
}

impl StoreState {
    fn new(config: &StoreConfig) -> Self {
        Self {
            pages: Vec::new(),
            current_index: 0,
            todos: Vec::new(),
            loaded_for: None,
            unmerged: Vec::new(),
            load_token: 0,
            cursor: Cursor::default(),
            undo: UndoStack::new(config.undo_capacity),
            last_deleted: Transient::new(config.undo_window),
            toast: Transient::new(config.toast_duration),
            next_key: 0,
        }
    }

    pub(crate) fn alloc_key(&mut self) -> SlotKey {
        self.next_key += 1;
        SlotKey(self.next_key)
    }

    pub(crate) fn current(&self) -> Option<&PageSlot> {
        self.pages.get(self.current_index)
    }

    pub(crate) fn current_key(&self) -> Option<SlotKey> {
        self.current().map(|slot| slot.key)
    }

    pub(crate) fn slot(&self, key: SlotKey) -> Option<&PageSlot> {
        self.pages.iter().find(|slot| slot.key == key)
    }

    pub(crate) fn slot_mut(&mut self, key: SlotKey) -> Option<&mut PageSlot> {
        self.pages.iter_mut().find(|slot| slot.key == key)
    }

    pub(crate) fn index_of_key(&self, key: SlotKey) -> Option<usize> {
        self.pages.iter().position(|slot| slot.key == key)
    }

    pub(crate) fn index_of_page(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|slot| slot.page.id == page_id)
    }

    /// The active page's todos are in memory
    pub(crate) fn is_loaded(&self) -> bool {
        self.loaded_for.is_some() && self.loaded_for == self.current_key()
    }

    /// Known to hold no todos. A page still loading is never empty.
    pub(crate) fn current_is_empty(&self) -> bool {
        self.is_loaded() && self.todos.is_empty()
    }

    /// Forget the previous page's todos and selection
    pub(crate) fn page_changed(&mut self) {
        self.todos.clear();
        self.loaded_for = None;
        self.unmerged.clear();
        self.cursor.reset();
    }

    /// Show a todo just written to the page in slot `key`. While that page
    /// is loading it is held back and merged into the load result.
    pub(crate) fn place_written(&mut self, key: SlotKey, todo: Todo) {
        if self.loaded_for == Some(key) {
            if position_of(&self.todos, &todo.id).is_none() {
                insert_newest_first(&mut self.todos, todo);
            }
        } else if self.current_key() == Some(key) {
            self.unmerged.push(todo);
        }
    }

    fn install_loaded(&mut self, key: SlotKey, mut todos: Vec<Todo>) {
        for todo in self.unmerged.drain(..) {
            if position_of(&todos, &todo.id).is_none() {
                insert_newest_first(&mut todos, todo);
            }
        }
        self.todos = todos;
        self.loaded_for = Some(key);
        self.cursor.reset();
    }
}

struct Inner {
    port: Arc<dyn PersistencePort>,
    state: Mutex<StoreState>,
    /// Page creations go through here one at a time
    creation_gate: Mutex<()>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

/// Shared handle to the page and todo state
#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<Inner>,
}

impl TodoStore {
    pub fn new(port: Arc<dyn PersistencePort>, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                port,
                state: Mutex::new(StoreState::new(&config)),
                creation_gate: Mutex::new(()),
                background: Mutex::new(Vec::new()),
            }),
        }
    }

    pub(crate) fn port(&self) -> &dyn PersistencePort {
        self.inner.port.as_ref()
    }

    pub(crate) async fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().await
    }

    pub(crate) async fn spawn_background<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut tasks = self.inner.background.lock().await;
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Wait until every background write has finished
    pub async fn settle(&self) {
        loop {
            let tasks: Vec<_> = self.inner.background.lock().await.drain(..).collect();
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    log::error!("Background task failed: {}", e);
                }
            }
        }
    }

    /// Log a failed write, surface it as an error toast, and hand it back
    pub(crate) async fn report(&self, err: DomainError, message: &str) -> DomainError {
        log::warn!("{}: {}", message, err);
        self.state().await.toast.show(Toast::error(message));
        err
    }

    pub async fn show_toast(&self, message: &str, kind: ToastKind) {
        let toast = match kind {
            ToastKind::Success => Toast::success(message),
            ToastKind::Error => Toast::error(message),
        };
        self.state().await.toast.show(toast);
    }

    pub async fn hide_toast(&self) {
        self.state().await.toast.clear();
    }

    /// Load every page and the first page's todos. Intended for startup.
    pub async fn load_pages(&self) -> DomainResult<()> {
        let pages = match self.port().list_pages().await {
            Ok(pages) => pages,
            Err(e) => return Err(self.report(e, "Failed to load pages").await),
        };
        log::info!("Loaded {} pages", pages.len());
        {
            let mut state = self.state().await;
            let slots: Vec<_> = pages
                .into_iter()
                .map(|page| PageSlot::persisted(state.alloc_key(), page))
                .collect();
            state.pages = slots;
            state.current_index = 0;
            state.page_changed();
        }
        self.reload_todos().await
    }

    /// Replace the in-memory todos with the active page's stored todos
    pub async fn reload_todos(&self) -> DomainResult<()> {
        let (key, page_id, token) = {
            let mut state = self.state().await;
            let Some(slot) = state.current() else {
                state.page_changed();
                return Ok(());
            };
            let key = slot.key;
            match slot.persisted_id().map(str::to_string) {
                Some(id) => {
                    state.page_changed();
                    state.load_token += 1;
                    (key, id, state.load_token)
                }
                None => {
                    // Nothing stored yet, so nothing to fetch
                    state.page_changed();
                    state.loaded_for = Some(key);
                    return Ok(());
                }
            }
        };

        match self.port().list_todos(&page_id).await {
            Ok(todos) => {
                let mut state = self.state().await;
                if state.current_key() == Some(key) && state.load_token == token {
                    state.install_loaded(key, todos);
                } else {
                    log::debug!("Dropping stale todos for page {}", page_id);
                }
                Ok(())
            }
            Err(e) => Err(self.report(e, "Failed to load tasks").await),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state().await;
        let current = state.current();
        Snapshot {
            pages: state.pages.iter().map(|slot| slot.page.clone()).collect(),
            current_index: current.map(|_| state.current_index),
            current_page: current.map(|slot| slot.page.clone()),
            current_page_pending: current.is_some_and(|slot| slot.persisted_id().is_none()),
            todos: state.todos.clone(),
            todos_loaded: state.is_loaded(),
            selected_index: state.cursor.selected_index(),
            editing_id: state.cursor.editing().map(str::to_string),
            last_deleted: state.last_deleted.get().cloned(),
            can_undo: !state.undo.is_empty(),
            undo_depth: state.undo.len(),
            toast: state.toast.get().cloned(),
        }
    }
}
