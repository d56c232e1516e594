//! Values that expire after a fixed duration.
//!
//! Expiry is checked lazily against the clock when the value is read, so
//! there are no timers to cancel. Showing a new value replaces both the old
//! value and its deadline.

use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Transient<T> {
    slot: Option<(T, Instant)>,
    ttl: Duration,
}

impl<T> Transient<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { slot: None, ttl }
    }

    /// Show `value` until `ttl` from now, superseding any current value
    pub fn show(&mut self, value: T) {
        self.slot = Some((value, Instant::now() + self.ttl));
    }

    /// The value if it has not expired yet
    pub fn get(&self) -> Option<&T> {
        match &self.slot {
            Some((value, deadline)) if Instant::now() < *deadline => Some(value),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// A short user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
        }
    }
}
