//! View Models
//!
//! Read-only state handed to the presentation layer, and due-date labels.

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;

use minidot_db::{Page, Todo};
use crate::transient::Toast;

/// Everything the presenter renders, captured at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Pages in display order
    pub pages: Vec<Page>,
    /// Index of the active page; `None` only when there are no pages
    pub current_index: Option<usize>,
    pub current_page: Option<Page>,
    /// The active page is not yet (or never was) persisted
    pub current_page_pending: bool,
    /// Active page's todos, newest first
    pub todos: Vec<Todo>,
    /// False while the active page's todos are still loading
    pub todos_loaded: bool,
    /// `-1` when nothing is selected
    pub selected_index: isize,
    pub editing_id: Option<String>,
    /// Drives the "undo available" hint; expires on its own
    pub last_deleted: Option<Todo>,
    /// Something is left to restore, even after the hint expired
    pub can_undo: bool,
    pub undo_depth: usize,
    pub toast: Option<Toast>,
}

/// Short label shown next to a due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Today,
    Tomorrow,
    Overdue,
    On(NaiveDate),
}

impl std::fmt::Display for DueLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DueLabel::Today => write!(f, "Today"),
            DueLabel::Tomorrow => write!(f, "Tomorrow"),
            DueLabel::Overdue => write!(f, "Overdue"),
            DueLabel::On(date) => write!(f, "{}", date.format("%b %-d")),
        }
    }
}

fn due_day<Tz: TimeZone>(due_ms: i64, now: &DateTime<Tz>) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(due_ms).map(|due| due.with_timezone(&now.timezone()).date_naive())
}

/// Label a due timestamp relative to `now`'s calendar day
pub fn due_label<Tz: TimeZone>(due_ms: i64, now: &DateTime<Tz>) -> Option<DueLabel> {
    let day = due_day(due_ms, now)?;
    let today = now.date_naive();
    Some(if day == today {
        DueLabel::Today
    } else if Some(day) == today.succ_opt() {
        DueLabel::Tomorrow
    } else if day < today {
        DueLabel::Overdue
    } else {
        DueLabel::On(day)
    })
}

/// Due before the start of today
pub fn is_overdue<Tz: TimeZone>(due_ms: i64, now: &DateTime<Tz>) -> bool {
    due_day(due_ms, now).is_some_and(|day| day < now.date_naive())
}
