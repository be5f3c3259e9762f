//! Persisted session token record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// The single active session of a principal.
///
/// Only the SHA-256 digest of the issued token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Token holder.
    pub principal: Principal,
    /// Lowercase hex SHA-256 digest of the token string.
    pub token_hash: String,
    /// When the token was issued (overwritten on re-issue).
    pub issued_at: DateTime<Utc>,
}
