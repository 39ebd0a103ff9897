//! User-facing error notices.
//!
//! The board reports failures the visitor must act on (a clear that did not
//! go through) through a [`Notifier`]; everything else is only logged.

use std::sync::{Mutex, PoisonError};

use tracing::warn;

pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Writes notices to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_error(&self, message: &str) {
        warn!(message, "user notice");
    }
}

/// Keeps every notice so callers can inspect or replay them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}
