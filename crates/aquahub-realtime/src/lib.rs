//! # aquahub-realtime
//!
//! Relays datastore notifications to every live WebSocket client.
//!
//! - Channel subscriptions are reference counted: the first connection
//!   starts `LISTEN` on the configured channels, the last one to leave
//!   stops it.
//! - Notifications arrive over an mpsc queue and are fanned out by a
//!   dedicated task, so a slow client never blocks the listener.

pub mod bridge;
pub mod connection;
pub mod metrics;
pub mod service;
pub mod subscription;

pub use bridge::NotificationBridge;
pub use connection::{ConnectionHandle, ConnectionId, ConnectionRegistry};
pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use service::RelayService;
pub use subscription::ChannelSubscriptionManager;
