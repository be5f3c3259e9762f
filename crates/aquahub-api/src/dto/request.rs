//! Request DTOs.

use serde::Deserialize;

use aquahub_core::result::AppResult;
use aquahub_core::types::Role;

/// Logout request body. Fields are optional so missing ones map to 400
/// instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    /// Account id.
    pub userid: Option<i64>,
    /// The token being revoked.
    pub token: Option<String>,
    /// Account role; taken from the token when omitted.
    #[serde(rename = "type")]
    pub role: Option<RoleField>,
}

/// Role as sent by clients: the numeric code (`1`, `"1"`) or the name
/// (`"customer"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RoleField {
    Code(i16),
    Name(String),
}

impl RoleField {
    pub fn into_role(self) -> AppResult<Role> {
        match self {
            Self::Code(code) => Role::from_code(code),
            Self::Name(name) => match name.trim().parse::<i16>() {
                Ok(code) => Role::from_code(code),
                Err(_) => name.parse(),
            },
        }
    }
}

/// Query parameters for the WebSocket upgrade.
#[derive(Debug, Clone, Deserialize)]
pub struct WsQuery {
    /// Session token.
    pub token: Option<String>,
}
