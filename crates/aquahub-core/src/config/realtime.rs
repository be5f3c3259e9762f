//! Notification relay configuration.

use serde::{Deserialize, Serialize};

/// Channels the relay listens on as a unit.
pub const DEFAULT_CHANNELS: [&str; 8] = [
    "LOGIN",
    "REGISTER",
    "CUSTOMER",
    "PRODUCT",
    "STAFF",
    "OWNER",
    "REFILLINGSTATION",
    "SALES",
];

/// Real-time (WebSocket relay) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Datastore notification channels, subscribed together when the first
    /// client attaches and released when the last one leaves.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    /// Keep the channel set subscribed for the whole process lifetime,
    /// independent of connected clients. A failure to listen at startup is
    /// fatal.
    #[serde(default)]
    pub listen_on_startup: bool,
    /// Per-connection outbound queue size. A connection whose queue is full
    /// is dropped.
    #[serde(default = "default_connection_buffer")]
    pub connection_buffer_size: usize,
    /// Queue size between the datastore listener and the fan-out task.
    #[serde(default = "default_notification_buffer")]
    pub notification_buffer_size: usize,
    /// Delay before the listener retries after losing its connection.
    #[serde(default = "default_listener_retry")]
    pub listener_retry_seconds: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            listen_on_startup: false,
            connection_buffer_size: default_connection_buffer(),
            notification_buffer_size: default_notification_buffer(),
            listener_retry_seconds: default_listener_retry(),
        }
    }
}

fn default_channels() -> Vec<String> {
    DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect()
}

fn default_connection_buffer() -> usize {
    256
}

fn default_notification_buffer() -> usize {
    1024
}

fn default_listener_retry() -> u64 {
    5
}
