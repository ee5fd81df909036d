// Notify module - toast-style notifications for the editor
//
// Every user-visible outcome (validation blocks, save results, clipboard
// fallbacks) lands here. The buffer is bounded; the oldest entries drop
// first. Each push is mirrored to tracing so headless runs still see it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Maximum number of notifications to keep in memory
const MAX_NOTIFICATIONS: usize = 100;

/// How long a toast stays on screen
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// Visual treatment of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Default,
    Destructive,
}

/// A single notification
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: Variant,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>, variant: Variant) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            title: title.into(),
            description: description.into(),
            variant,
            duration: DEFAULT_DURATION,
            created_at: Utc::now(),
        }
    }

    /// Check if the notification has expired and should no longer be shown
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.created_at)
            .to_std()
            .unwrap_or_default();
        elapsed >= self.duration
    }

    pub fn is_destructive(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

/// Shared notification buffer (cheap to clone)
#[derive(Clone, Default)]
pub struct Notifications {
    entries: Arc<Mutex<VecDeque<Notification>>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_NOTIFICATIONS))),
        }
    }

    /// Add a notification, dropping the oldest if at capacity
    pub fn push(&self, notification: Notification) {
        match notification.variant {
            Variant::Destructive => tracing::warn!(
                title = %notification.title,
                "{}",
                notification.description
            ),
            Variant::Default => tracing::info!(
                title = %notification.title,
                "{}",
                notification.description
            ),
        }

        let mut entries = self.lock();
        if entries.len() >= MAX_NOTIFICATIONS {
            entries.pop_front();
        }
        entries.push_back(notification);
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.push(Notification::new(title, description, Variant::Default));
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.push(Notification::new(title, description, Variant::Destructive));
    }

    /// Most recent first
    pub fn recent(&self, limit: usize) -> Vec<Notification> {
        self.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Notifications still within their display duration
    pub fn active(&self) -> Vec<Notification> {
        let now = Utc::now();
        self.lock()
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    /// Titles in arrival order
    pub fn titles(&self) -> Vec<String> {
        self.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        // Recover the buffer if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_recent_order() {
        let notes = Notifications::new();
        notes.success("first", "a");
        notes.error("second", "b");

        let recent = notes.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "second");
        assert!(recent[0].is_destructive());
        assert_eq!(notes.titles(), vec!["first", "second"]);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let notes = Notifications::new();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            notes.success(format!("n{i}"), "");
        }
        assert_eq!(notes.len(), MAX_NOTIFICATIONS);
        assert_eq!(notes.titles()[0], "n5");
    }

    #[test]
    fn test_expiry() {
        let n = Notification::new("t", "d", Variant::Default);
        assert!(!n.is_expired(n.created_at));
        assert!(n.is_expired(n.created_at + chrono::Duration::seconds(6)));
    }

    #[test]
    fn test_clones_share_buffer() {
        let notes = Notifications::new();
        let other = notes.clone();
        other.success("shared", "");
        assert_eq!(notes.titles(), vec!["shared"]);
        assert_eq!(notes.active().len(), 1);
    }
}
