//! Transient, user-visible notifications ("toasts").

use crate::language::{Language, MessageKey};
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    /// How long the toast stays on screen.
    pub auto_close: Duration,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
            auto_close: Duration::from_millis(2000),
            created_at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            auto_close: Duration::from_millis(3000),
            created_at: Utc::now(),
        }
    }

    pub fn from_key(level: Level, key: MessageKey, language: Language) -> Self {
        match level {
            Level::Success => Self::success(key.text(language)),
            Level::Error => Self::error(key.text(language)),
        }
    }
}

/// Where notifications go. The UI layer implements this; the crate ships a
/// logging sink and an in-memory one.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => log::info!("{}", notification.message),
            Level::Error => log::warn!("{}", notification.message),
        }
    }
}

/// Keeps notifications in memory until they are drained.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *entries)
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        let entries = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .iter()
            .map(|n| (n.level, n.message.clone()))
            .collect()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        log::debug!("notification [{}]: {}", notification.level, notification.message);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_durations() {
        assert_eq!(Notification::success("ok").auto_close, Duration::from_secs(2));
        assert_eq!(Notification::error("no").auto_close, Duration::from_secs(3));
    }

    #[test]
    fn test_log_drains() {
        let log = NotificationLog::new();
        log.notify(Notification::from_key(
            Level::Success,
            MessageKey::AddSuccess,
            Language::En,
        ));
        assert_eq!(log.messages(), vec![(Level::Success, "Added successfully".to_string())]);
        assert_eq!(log.drain().len(), 1);
        assert!(log.messages().is_empty());
    }
}
