//! Shared domain types.

pub mod notification;
pub mod principal;
pub mod session_token;

pub use notification::Notification;
pub use principal::{Principal, Role};
pub use session_token::SessionToken;
