//! Reference-counted datastore channel subscriptions.

pub mod manager;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use manager::ChannelSubscriptionManager;
#[cfg(any(test, feature = "mock"))]
pub use mock::{ListenEvent, RecordingCommander};
