use std::sync::Mutex;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Error,
}

/// A one-line, user-facing message. Every screen reports outcomes this way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification::new(Level::Success, message));
    }

    fn info(&self, message: &str) {
        self.notify(Notification::new(Level::Info, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::new(Level::Error, message));
    }
}

/// Prints notifications to stderr, keeping stdout for rendered pages.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => {
                info!(target: "vidshare::notify", "{}", notification.message);
                eprintln!("✔ {}", notification.message);
            }
            Level::Info => {
                info!(target: "vidshare::notify", "{}", notification.message);
                eprintln!("• {}", notification.message);
            }
            Level::Error => {
                error!(target: "vidshare::notify", "{}", notification.message);
                eprintln!("✘ {}", notification.message);
            }
        }
    }
}

/// Keeps every notification in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.message).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications().pop()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}
