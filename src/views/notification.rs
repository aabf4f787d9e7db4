//! Notifications
//!
//! Transient success/error banners that dismiss themselves after a fixed
//! time. Expiry is checked against a caller-supplied instant, so a banner is
//! simply not rendered once its time has passed.

use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    shown_at: Instant,
    ttl: Duration,
}

impl Notification {
    pub fn success(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(message, NotificationKind::Success, ttl)
    }

    pub fn error(message: impl Into<String>, ttl: Duration) -> Self {
        Self::new(message, NotificationKind::Error, ttl)
    }

    fn new(message: impl Into<String>, kind: NotificationKind, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.ttl
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Instant::now())
    }

    pub fn expires_at(&self) -> Instant {
        self.shown_at + self.ttl
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
        };
        write!(f, "{} {}", icon, self.message)
    }
}
