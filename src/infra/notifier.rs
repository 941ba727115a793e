//! GUI notifier adapters.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::core::{GuiNotifier, NotifyKind};
use crate::util::clock::now_ms;

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind.
    pub kind: NotifyKind,
    /// Payload text.
    pub payload: String,
    /// Target endpoint.
    pub target: String,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// In-memory notifier for testing and dev; keeps the most recent notifications.
#[derive(Debug)]
pub struct InMemoryNotifier {
    events: Mutex<VecDeque<Notification>>,
    max_events: usize,
}

impl InMemoryNotifier {
    /// Create a notifier with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Snapshot of stored notifications, oldest first.
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().iter().cloned().collect()
    }

    /// Stored notifications of one kind.
    pub fn of_kind(&self, kind: NotifyKind) -> Vec<Notification> {
        self.events
            .lock()
            .iter()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl GuiNotifier for InMemoryNotifier {
    fn notify(&self, kind: NotifyKind, payload: &str, target: &str) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(Notification {
            kind,
            payload: payload.to_string(),
            target: target.to_string(),
            created_at_ms: now_ms(),
        });
    }
}

/// Notifier that only logs; used when no GUI transport is wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl GuiNotifier for TracingNotifier {
    fn notify(&self, kind: NotifyKind, payload: &str, target: &str) {
        tracing::info!(?kind, %target, %payload, "gui notification");
    }
}
