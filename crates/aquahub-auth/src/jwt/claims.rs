//! JWT claims structure embedded in every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aquahub_core::types::{Principal, Role};

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's account id.
    pub sub: i64,
    /// Principal role at the time of issuance.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second differ.
    pub jti: Uuid,
}

impl Claims {
    /// Returns the principal the token was issued to.
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, self.role)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
