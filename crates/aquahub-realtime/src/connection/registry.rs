//! Connection registry.
//!
//! Membership changes that move the registry between empty and non-empty
//! go through one transition lock, together with the matching
//! `subscribe_all`/`unsubscribe_all`. Reads (`snapshot`, `len`, `get`)
//! never take it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use aquahub_core::result::AppResult;

use super::handle::{ConnectionHandle, ConnectionId};
use crate::metrics::RelayMetrics;
use crate::subscription::ChannelSubscriptionManager;

/// Thread-safe set of live connections.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    transition: Mutex<()>,
    subscriptions: Arc<ChannelSubscriptionManager>,
    channels: Vec<String>,
    metrics: Arc<RelayMetrics>,
}

impl ConnectionRegistry {
    /// Creates an empty registry that holds `channels` while non-empty.
    pub fn new(
        subscriptions: Arc<ChannelSubscriptionManager>,
        channels: Vec<String>,
        metrics: Arc<RelayMetrics>,
    ) -> Self {
        Self {
            connections: DashMap::new(),
            transition: Mutex::new(()),
            subscriptions,
            channels,
            metrics,
        }
    }

    /// Registers a connection. The first connection subscribes the channel
    /// set; if that fails the connection is not kept.
    pub async fn add(&self, handle: Arc<ConnectionHandle>) -> AppResult<()> {
        let _guard = self.transition.lock().await;

        let id = handle.id;
        self.connections.insert(id, handle);

        if self.connections.len() == 1 {
            if let Err(e) = self.subscriptions.subscribe_all(&self.channels).await {
                if let Some((_, handle)) = self.connections.remove(&id) {
                    handle.mark_dead();
                }
                warn!(connection_id = %id, "Connection rejected, channel subscription failed");
                return Err(e);
            }
            info!(channels = ?self.channels, "First connection, channels subscribed");
        }

        self.metrics.connection_opened();
        Ok(())
    }

    /// Unregisters a connection. The last one out unsubscribes the channel
    /// set. Returns `false` if the id was not registered.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let _guard = self.transition.lock().await;

        let Some((_, handle)) = self.connections.remove(&id) else {
            return false;
        };
        handle.mark_dead();
        self.metrics.connection_closed();

        if self.connections.is_empty() {
            // Failures are logged by the subscription manager.
            let _ = self.subscriptions.unsubscribe_all(&self.channels).await;
            info!("Last connection gone, channels released");
        }
        true
    }

    /// Closes every connection and releases the channel set.
    pub async fn close_all(&self) -> usize {
        let _guard = self.transition.lock().await;

        let ids: Vec<ConnectionId> = self.connections.iter().map(|e| *e.key()).collect();
        let mut closed = 0;
        for id in ids {
            if let Some((_, handle)) = self.connections.remove(&id) {
                handle.mark_dead();
                self.metrics.connection_closed();
                closed += 1;
            }
        }

        if closed > 0 {
            let _ = self.subscriptions.unsubscribe_all(&self.channels).await;
            info!(closed, "All connections closed");
        }
        closed
    }

    /// Point-in-time copy of the registered handles.
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn get(&self, id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
