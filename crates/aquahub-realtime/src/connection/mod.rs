//! Live client connections.

pub mod handle;
pub mod registry;

pub use handle::{ConnectionHandle, ConnectionId, DeliveryFailure};
pub use registry::ConnectionRegistry;
