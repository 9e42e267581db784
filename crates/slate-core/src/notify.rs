//! Dismissible toast notifications.
//!
//! The only user-visible failure signal in the dashboard: remote errors and
//! not-found outcomes both land here, the UI stays interactive. Undo pushes
//! a toast whose id doubles as the dismiss handle on the undo record.

use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// Handle for dismissing a specific toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
    /// Announces a completed delete and that undo is available.
    Undo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// FIFO queue of live toasts with monotonically increasing ids.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    queue: VecDeque<Toast>,
}

impl Toasts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> ToastId {
        let id = ToastId(self.next_id);
        self.next_id += 1;
        self.queue.push_back(Toast {
            id,
            kind,
            message: message.into(),
            created_at: now,
        });
        id
    }

    /// Returns false when the toast already expired or was dismissed.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|t| t.id != id);
        self.queue.len() != before
    }

    /// Drop toasts older than `ttl`.
    pub fn expire(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.queue.retain(|t| now - t.created_at < ttl);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.queue.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Toast> {
        self.queue.back()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ToastKind, Toasts};
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn push_dismiss_roundtrip() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut toasts = Toasts::new();
        let a = toasts.push(ToastKind::Info, "hello", now);
        let b = toasts.push(ToastKind::Error, "boom", now);
        assert_ne!(a, b);
        assert!(toasts.dismiss(a));
        assert!(!toasts.dismiss(a));
        assert_eq!(toasts.latest().unwrap().message, "boom");
    }

    #[test]
    fn expire_drops_only_old_toasts() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut toasts = Toasts::new();
        toasts.push(ToastKind::Info, "old", t0);
        toasts.push(ToastKind::Info, "new", t0 + Duration::seconds(3));
        toasts.expire(t0 + Duration::seconds(5), Duration::seconds(4));
        assert_eq!(toasts.iter().count(), 1);
        assert_eq!(toasts.latest().unwrap().message, "new");
    }
}
