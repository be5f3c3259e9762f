//! Channel reference counting.
//!
//! A channel is subscribed on the datastore exactly while its count is
//! positive. The count table lock is held across the `LISTEN`/`UNLISTEN`
//! round trip, so a 0→1 edge and a 1→0 edge for the same channel never
//! overlap.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use aquahub_core::error::AppError;
use aquahub_core::result::AppResult;
use aquahub_core::traits::ListenCommander;

use crate::metrics::RelayMetrics;

/// Tracks how many holders each channel has and drives the listener.
#[derive(Debug)]
pub struct ChannelSubscriptionManager {
    commander: Arc<dyn ListenCommander>,
    counts: Mutex<HashMap<String, usize>>,
    metrics: Arc<RelayMetrics>,
}

impl ChannelSubscriptionManager {
    pub fn new(commander: Arc<dyn ListenCommander>, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            commander,
            counts: Mutex::new(HashMap::new()),
            metrics,
        }
    }

    /// Takes a reference on `channel`, starting `LISTEN` on the first one.
    ///
    /// If the datastore refuses, the reference is not kept and a
    /// `Listen` error is returned.
    pub async fn subscribe(&self, channel: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().await;
        self.acquire(&mut counts, channel).await
    }

    /// Drops a reference on `channel`, stopping `LISTEN` on the last one.
    ///
    /// A channel without references is left alone. A failed `UNLISTEN`
    /// still releases the channel locally.
    pub async fn unsubscribe(&self, channel: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().await;
        self.release(&mut counts, channel).await
    }

    /// Takes a reference on every channel, or on none of them.
    pub async fn subscribe_all(&self, channels: &[String]) -> AppResult<()> {
        let mut counts = self.counts.lock().await;

        for (idx, channel) in channels.iter().enumerate() {
            if let Err(e) = self.acquire(&mut counts, channel).await {
                for acquired in channels[..idx].iter().rev() {
                    // Release failures are already logged.
                    let _ = self.release(&mut counts, acquired).await;
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Drops a reference on every channel, returning the first failure.
    pub async fn unsubscribe_all(&self, channels: &[String]) -> AppResult<()> {
        let mut counts = self.counts.lock().await;
        let mut first_err = None;

        for channel in channels {
            if let Err(e) = self.release(&mut counts, channel).await {
                first_err.get_or_insert(e);
            }
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Current number of references on `channel`.
    pub async fn ref_count(&self, channel: &str) -> usize {
        self.counts.lock().await.get(channel).copied().unwrap_or(0)
    }

    /// Channels with at least one reference, sorted.
    pub async fn active_channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.counts.lock().await.keys().cloned().collect();
        channels.sort();
        channels
    }

    async fn acquire(&self, counts: &mut HashMap<String, usize>, channel: &str) -> AppResult<()> {
        let count = counts.entry(channel.to_string()).or_insert(0);
        *count += 1;
        if *count > 1 {
            debug!(channel, refs = *count, "Channel reference taken");
            return Ok(());
        }

        match self.commander.start_listening(channel).await {
            Ok(()) => {
                self.metrics.listen_started();
                info!(channel, "Listening started");
                Ok(())
            }
            Err(e) => {
                counts.remove(channel);
                self.metrics.listen_failed();
                error!(channel, error = %e, "Failed to start listening");
                Err(AppError::listen(format!(
                    "Failed to listen on channel {channel}: {}",
                    e.message
                )))
            }
        }
    }

    async fn release(&self, counts: &mut HashMap<String, usize>, channel: &str) -> AppResult<()> {
        let Some(count) = counts.get_mut(channel) else {
            debug!(channel, "Release on unreferenced channel ignored");
            return Ok(());
        };

        *count -= 1;
        if *count > 0 {
            debug!(channel, refs = *count, "Channel reference dropped");
            return Ok(());
        }
        counts.remove(channel);

        match self.commander.stop_listening(channel).await {
            Ok(()) => {
                self.metrics.listen_stopped();
                info!(channel, "Listening stopped");
                Ok(())
            }
            Err(e) => {
                self.metrics.listen_failed();
                error!(channel, error = %e, "Failed to stop listening");
                Err(AppError::listen(format!(
                    "Failed to unlisten channel {channel}: {}",
                    e.message
                )))
            }
        }
    }
}
