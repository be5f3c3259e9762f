//! Top-level relay service that ties the subsystems together.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::info;

use aquahub_core::config::RealtimeConfig;
use aquahub_core::result::AppResult;
use aquahub_core::traits::ListenCommander;
use aquahub_core::types::{Notification, Principal};

use crate::bridge::NotificationBridge;
use crate::connection::{ConnectionHandle, ConnectionId, ConnectionRegistry};
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::subscription::ChannelSubscriptionManager;

/// Entry point used by the WebSocket layer and the binary.
#[derive(Clone)]
pub struct RelayService {
    config: RealtimeConfig,
    subscriptions: Arc<ChannelSubscriptionManager>,
    registry: Arc<ConnectionRegistry>,
    bridge: Arc<NotificationBridge>,
    metrics: Arc<RelayMetrics>,
    pinned: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RelayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayService")
            .field("channels", &self.config.channels)
            .field("connections", &self.registry.len())
            .finish()
    }
}

impl RelayService {
    /// Wires the subscription manager, registry, bridge, and metrics.
    pub fn new(config: RealtimeConfig, commander: Arc<dyn ListenCommander>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RelayMetrics::new());
        let subscriptions = Arc::new(ChannelSubscriptionManager::new(commander, metrics.clone()));
        let registry = Arc::new(ConnectionRegistry::new(
            subscriptions.clone(),
            config.channels.clone(),
            metrics.clone(),
        ));
        let bridge = Arc::new(NotificationBridge::new(registry.clone(), metrics.clone()));

        info!(channels = ?config.channels, "Relay service initialized");

        Self {
            config,
            subscriptions,
            registry,
            bridge,
            metrics,
            pinned: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Registers a new client and returns the queue its socket drains.
    pub async fn handle_connect(
        &self,
        principal: Principal,
    ) -> AppResult<(ConnectionId, mpsc::Receiver<String>)> {
        let (tx, rx) = mpsc::channel(self.config.connection_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(principal, tx));
        let id = handle.id;

        self.registry.add(handle).await?;

        info!(connection_id = %id, principal = %principal, "Client connected");
        Ok((id, rx))
    }

    /// Unregisters a client. Unknown ids are ignored.
    pub async fn handle_disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.registry.remove(id).await;
        if removed {
            info!(connection_id = %id, "Client disconnected");
        }
        removed
    }

    /// Starts the fan-out task draining the listener's notification queue.
    pub fn spawn_fanout(&self, notifications: mpsc::Receiver<Notification>) -> JoinHandle<()> {
        let bridge = self.bridge.clone();
        let shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(bridge.run(notifications, shutdown))
    }

    /// Holds a permanent reference on the configured channels so they stay
    /// subscribed with no clients attached.
    pub async fn pin_channels(&self) -> AppResult<()> {
        if self.pinned.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Err(e) = self.subscriptions.subscribe_all(&self.config.channels).await {
            self.pinned.store(false, Ordering::SeqCst);
            return Err(e);
        }
        info!(channels = ?self.config.channels, "Channels pinned at startup");
        Ok(())
    }

    /// Stops the fan-out task, closes every connection, and releases pins.
    pub async fn shutdown(&self) {
        info!("Shutting down relay service");

        let _ = self.shutdown_tx.send(());
        self.registry.close_all().await;

        if self.pinned.swap(false, Ordering::SeqCst) {
            let _ = self
                .subscriptions
                .unsubscribe_all(&self.config.channels)
                .await;
        }

        info!("Relay service shut down");
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub async fn active_channels(&self) -> Vec<String> {
        self.subscriptions.active_channels().await
    }
}
