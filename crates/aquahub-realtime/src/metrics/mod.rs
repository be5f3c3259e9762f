//! Relay metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Relay-level counters.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Connections ever accepted
    pub connections_total: AtomicU64,
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Connections dropped because a push failed
    pub connections_dropped: AtomicU64,
    /// Notifications taken off the queue
    pub notifications_received: AtomicU64,
    /// Payloads handed to a connection queue
    pub messages_delivered: AtomicU64,
    /// `LISTEN` commands acknowledged
    pub listens_started: AtomicU64,
    /// `UNLISTEN` commands acknowledged
    pub listens_stopped: AtomicU64,
    /// `LISTEN`/`UNLISTEN` commands that failed
    pub listen_failures: AtomicU64,
}

impl RelayMetrics {
    /// Create zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_dropped(&self) {
        self.connections_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn notification_received(&self) {
        self.notifications_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn message_delivered(&self) {
        self.messages_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn listen_started(&self) {
        self.listens_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn listen_stopped(&self) {
        self.listens_stopped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn listen_failed(&self) {
        self.listen_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            connections_dropped: self.connections_dropped.load(Ordering::Relaxed),
            notifications_received: self.notifications_received.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            listens_started: self.listens_started.load(Ordering::Relaxed),
            listens_stopped: self.listens_stopped.load(Ordering::Relaxed),
            listen_failures: self.listen_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub connections_dropped: u64,
    pub notifications_received: u64,
    pub messages_delivered: u64,
    pub listens_started: u64,
    pub listens_stopped: u64,
    pub listen_failures: u64,
}
