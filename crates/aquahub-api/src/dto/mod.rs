//! Request and response bodies.

pub mod request;
pub mod response;

pub use request::{LogoutRequest, RoleField, WsQuery};
pub use response::{HealthResponse, MessageResponse};
