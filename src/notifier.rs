//! Due-date reminders.
//!
//! Polls for open todos that are due soon and sends each one reminder at
//! most once per 24 hours. Delivery is behind [`ReminderSink`]; the query
//! side is behind [`DueSource`].

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use minidot_db::{DomainResult, Todo};

use crate::config::NotifierConfig;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

pub const REMINDER_TITLE: &str = "Task Reminder";

/// Read access to todos with upcoming due dates
#[async_trait]
pub trait DueSource: Send + Sync {
    async fn upcoming_due_todos(&self, within_hours: u32) -> DomainResult<Vec<Todo>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub todo_id: String,
    pub title: String,
    pub body: String,
}

/// Delivers reminders, e.g. as OS notifications
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn send(&self, reminder: &Reminder) -> DomainResult<()>;
}

/// Writes reminders to the log
pub struct LogSink;

#[async_trait]
impl ReminderSink for LogSink {
    async fn send(&self, reminder: &Reminder) -> DomainResult<()> {
        log::info!("{}: {}", reminder.title, reminder.body);
        Ok(())
    }
}

pub fn reminder_body(text: &str, hours_until_due: f64) -> String {
    if hours_until_due <= 1.0 {
        format!("\"{}\" is due in less than 1 hour", text)
    } else {
        format!("\"{}\" is due in {} hours", text, hours_until_due.round() as i64)
    }
}

/// Todo ids already reminded about, with the time of the reminder
#[derive(Debug, Default)]
pub struct NotifiedLog {
    path: Option<PathBuf>,
    entries: HashMap<String, i64>,
}

impl NotifiedLog {
    /// Kept in memory only
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`, dropping entries older than a day. A missing or
    /// unreadable file starts an empty log.
    pub fn load(path: &Path, now_ms: i64) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable reminder log {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        let mut notified = Self {
            path: Some(path.to_path_buf()),
            entries,
        };
        notified.prune(now_ms);
        notified
    }

    pub fn contains(&self, todo_id: &str) -> bool {
        self.entries.contains_key(todo_id)
    }

    pub fn prune(&mut self, now_ms: i64) {
        self.entries.retain(|_, at| now_ms - *at < DAY_MS);
    }

    pub fn mark(&mut self, todo_id: &str, now_ms: i64) {
        self.entries.insert(todo_id.to_string(), now_ms);
        if let Err(e) = self.save() {
            log::warn!("Failed to save reminder log: {}", e);
        }
    }

    fn save(&self) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(path, json)
    }
}

pub struct Notifier<D, S> {
    source: D,
    sink: S,
    notified: NotifiedLog,
    config: NotifierConfig,
}

impl<D: DueSource, S: ReminderSink> Notifier<D, S> {
    pub fn new(source: D, sink: S, notified: NotifiedLog, config: NotifierConfig) -> Self {
        Self {
            source,
            sink,
            notified,
            config,
        }
    }

    /// One polling pass at `now_ms`; returns the reminders sent
    pub async fn check_at(&mut self, now_ms: i64) -> DomainResult<Vec<Reminder>> {
        self.notified.prune(now_ms);
        let upcoming = self.source.upcoming_due_todos(self.config.lookahead_hours).await?;
        let remind_within = self.config.remind_within_minutes as f64 / 60.0;

        let mut sent = Vec::new();
        for todo in upcoming {
            let Some(due) = todo.due_date else { continue };
            if self.notified.contains(&todo.id) {
                continue;
            }
            let hours_until_due = (due - now_ms) as f64 / HOUR_MS;
            if hours_until_due > remind_within {
                continue;
            }
            let reminder = Reminder {
                todo_id: todo.id.clone(),
                title: REMINDER_TITLE.to_string(),
                body: reminder_body(&todo.text, hours_until_due),
            };
            match self.sink.send(&reminder).await {
                Ok(()) => {
                    self.notified.mark(&todo.id, now_ms);
                    sent.push(reminder);
                }
                Err(e) => log::warn!("Failed to send reminder for {}: {}", todo.id, e),
            }
        }
        Ok(sent)
    }

    /// Poll until `shutdown` completes
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        let initial_delay = Duration::from_secs(self.config.initial_delay_secs);
        let period = Duration::from_secs(self.config.interval_secs);
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + initial_delay, period);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Reminder loop stopped");
                    return;
                }
                _ = interval.tick() => {
                    let now_ms = chrono::Utc::now().timestamp_millis();
                    match self.check_at(now_ms).await {
                        Ok(sent) if !sent.is_empty() => log::info!("Sent {} reminders", sent.len()),
                        Ok(_) => {}
                        Err(e) => log::warn!("Reminder check failed: {}", e),
                    }
                }
            }
        }
    }
}
