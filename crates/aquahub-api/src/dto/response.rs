//! Response DTOs.

use serde::{Deserialize, Serialize};

use aquahub_realtime::MetricsSnapshot;

/// Plain message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: String,
    /// Database state: `connected`, `unavailable`, or `disabled`.
    pub database: String,
    /// Live WebSocket connections.
    pub connections: usize,
    /// Channels currently under `LISTEN`.
    pub active_channels: Vec<String>,
    /// Relay counters.
    pub metrics: MetricsSnapshot,
}
