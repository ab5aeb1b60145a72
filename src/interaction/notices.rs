use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// User-visible, dismissable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Holds the latest notice and drops it once its timeout has passed.
///
/// A new notice replaces the previous one and restarts the clock.
#[derive(Debug)]
pub struct NoticeBoard {
    timeout: Duration,
    current: Mutex<Option<(Notice, Instant)>>,
}

impl NoticeBoard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            current: Mutex::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Notice still on display, if any
    pub fn current(&self) -> Option<Notice> {
        let mut slot = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = matches!(&*slot, Some((_, posted)) if posted.elapsed() >= self.timeout);
        if expired {
            *slot = None;
        }
        slot.as_ref().map(|(notice, _)| notice.clone())
    }

    pub fn dismiss(&self) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some((notice, Instant::now()));
    }
}

/// Prints notices to the terminal and keeps them on a [`NoticeBoard`]
#[derive(Debug)]
pub struct ConsoleNotifier {
    board: NoticeBoard,
}

impl ConsoleNotifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            board: NoticeBoard::new(timeout),
        }
    }

    pub fn board(&self) -> &NoticeBoard {
        &self.board
    }

    /// Whether the last notice still on display reports a failure
    pub fn last_was_error(&self) -> bool {
        self.board
            .current()
            .is_some_and(|notice| notice.severity == Severity::Error)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        let icon = match notice.severity {
            Severity::Success => "✅",
            Severity::Info => "ℹ️ ",
            Severity::Warning => "⚠️ ",
            Severity::Error => "❌",
        };
        println!("{icon} {}", notice.message);
        tracing::info!(severity = ?notice.severity, message = %notice.message, "Notice posted");
        self.board.notify(notice);
    }
}
