//! Pushes every datastore notification to every registered connection.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use aquahub_core::types::Notification;

use crate::connection::ConnectionRegistry;
use crate::metrics::RelayMetrics;

/// Fan-out stage between the listener queue and client sockets.
#[derive(Debug)]
pub struct NotificationBridge {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RelayMetrics>,
}

impl NotificationBridge {
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RelayMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Sends the payload verbatim to all connections.
    ///
    /// Connections that cannot take the payload are dropped from the
    /// registry; the rest still receive it. Dropping the last connection
    /// releases the channels, which waits on the listener task, so removal
    /// runs on a detached task whose handle is returned.
    pub fn on_notification(&self, notification: &Notification) -> Option<JoinHandle<()>> {
        self.metrics.notification_received();

        let handles = self.registry.snapshot();
        let mut failed = Vec::new();

        for handle in &handles {
            match handle.try_deliver(&notification.payload) {
                Ok(()) => self.metrics.message_delivered(),
                Err(reason) => {
                    warn!(
                        connection_id = %handle.id,
                        principal = %handle.principal,
                        channel = %notification.channel,
                        %reason,
                        "Dropping connection, push failed"
                    );
                    failed.push(handle.id);
                }
            }
        }

        debug!(
            channel = %notification.channel,
            recipients = handles.len() - failed.len(),
            "Notification relayed"
        );

        if failed.is_empty() {
            return None;
        }

        let registry = self.registry.clone();
        let metrics = self.metrics.clone();
        Some(tokio::spawn(async move {
            for id in failed {
                if registry.remove(id).await {
                    metrics.connection_dropped();
                }
            }
        }))
    }

    /// Consumes the notification queue until it closes or shutdown fires.
    pub async fn run(
        self: Arc<Self>,
        mut notifications: mpsc::Receiver<Notification>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        info!("Notification fan-out started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                next = notifications.recv() => match next {
                    Some(notification) => {
                        self.on_notification(&notification);
                    }
                    None => break,
                },
            }
        }
        info!("Notification fan-out stopped");
    }
}
