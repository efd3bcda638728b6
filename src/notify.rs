//! Transient and blocking notifications raised by controller operations.
//!
//! Controllers push notifications into a [`Notifier`]; the CLI drains it
//! after each command and prints the messages to stderr.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Default auto-dismiss duration for transient notifications
const DEFAULT_DISMISS_SECONDS: u64 = 4;

/// Maximum notifications kept before the oldest are dropped
const MAX_PENDING: usize = 50;

/// Notification level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationLevel {
    /// Get icon/prefix for this level
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✗",
        }
    }
}

/// A single notification.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Blocking notifications stay until acknowledged.
    pub sticky: bool,
    #[serde(skip)]
    pub created_at: Instant,
    #[serde(skip)]
    pub duration: Option<Duration>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            sticky: false,
            created_at: Instant::now(),
            duration: Some(Duration::from_secs(DEFAULT_DISMISS_SECONDS)),
        }
    }

    /// Create a notification that won't auto-dismiss
    pub fn sticky(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            sticky: true,
            duration: None,
            ..Self::new(level, message)
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.duration {
            Some(duration) => now.duration_since(self.created_at) >= duration,
            None => false,
        }
    }
}

/// Collects notifications produced during one or more operations.
#[derive(Debug, Default)]
pub struct Notifier {
    pending: VecDeque<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push_back(notification);
        if self.pending.len() > MAX_PENDING {
            self.pending.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationLevel::Info, message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationLevel::Success, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationLevel::Warning, message));
    }

    /// Transient error (remote fetch or validation failure).
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::new(NotificationLevel::Error, message));
    }

    /// Blocking error (authentication failure).
    pub fn blocking(&mut self, message: impl Into<String>) {
        self.push(Notification::sticky(NotificationLevel::Error, message));
    }

    /// Drop transient notifications whose display time has passed.
    pub fn expire(&mut self, now: Instant) {
        self.pending.retain(|n| !n.is_expired_at(now));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_never_expires() {
        let sticky = Notification::sticky(NotificationLevel::Error, "Invalid GitHub token");
        let later = Instant::now() + Duration::from_secs(3600);
        assert!(!sticky.is_expired_at(later));
        assert!(sticky.sticky);
    }

    #[test]
    fn test_expire_drops_only_transient() {
        let mut notifier = Notifier::new();
        notifier.error("Error loading files");
        notifier.blocking("Invalid GitHub token");

        notifier.expire(Instant::now() + Duration::from_secs(DEFAULT_DISMISS_SECONDS + 1));
        let left = notifier.drain();
        assert_eq!(left.len(), 1);
        assert!(left[0].sticky);
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_pending_is_bounded() {
        let mut notifier = Notifier::new();
        for i in 0..(MAX_PENDING + 5) {
            notifier.info(format!("Message {}", i));
        }
        assert_eq!(notifier.iter().count(), MAX_PENDING);
        assert_eq!(notifier.iter().next().unwrap().message, "Message 5");
    }
}
