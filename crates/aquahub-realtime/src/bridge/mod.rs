//! Datastore notification → client fan-out.

pub mod notification_bridge;

pub use notification_bridge::NotificationBridge;
