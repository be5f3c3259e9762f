//! Datastore notifications.

use serde::{Deserialize, Serialize};

/// A `(channel, payload)` pair emitted by the datastore's `NOTIFY`.
///
/// The payload is opaque and forwarded to clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Channel the notification was raised on.
    pub channel: String,
    /// Raw payload string.
    pub payload: String,
}

impl Notification {
    /// Creates a notification.
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}
