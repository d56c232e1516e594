//! Minidot
//!
//! Page and todo state engine for a popup task manager:
//! - store: pages, todos, undo and selection, mediated against storage
//! - keymap: keyboard chords to store intents
//! - notifier: due-date reminders
//! - config: settings file and defaults

pub mod config;
pub mod keymap;
pub mod models;
pub mod notifier;
pub mod selection;
pub mod store;
pub mod transient;
pub mod undo;

pub use config::{AppConfig, NotifierConfig, StoreConfig};
pub use keymap::{resolve, Dispatch, Intent, Key, KeyContext, KeyPress, Modifiers};
pub use models::{due_label, is_overdue, DueLabel, Snapshot};
pub use notifier::{DueSource, LogSink, NotifiedLog, Notifier, Reminder, ReminderSink};
pub use store::TodoStore;
pub use transient::{Toast, ToastKind};

pub use minidot_db::{DomainError, DomainResult, Page, SearchHit, Todo};
