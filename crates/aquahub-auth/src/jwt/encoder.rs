//! JWT token creation with the process signing key and a fixed TTL.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use aquahub_core::error::AppError;
use aquahub_core::result::AppResult;
use aquahub_core::types::Principal;

use super::claims::Claims;
use super::key::SigningKey;

/// Creates signed session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC key for signing.
    encoding_key: EncodingKey,
    /// Token validity window.
    ttl: TimeDelta,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder.
    ///
    /// A TTL of zero, or one too large to add to a timestamp, is a
    /// configuration error.
    pub fn new(key: &SigningKey, ttl_minutes: u64) -> AppResult<Self> {
        let ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .filter(|ttl| *ttl > TimeDelta::zero())
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "auth.token_ttl_minutes must be between 1 and {} minutes, got {ttl_minutes}",
                    TimeDelta::MAX.num_minutes()
                ))
            })?;

        Ok(Self {
            encoding_key: key.encoding_key(),
            ttl,
        })
    }

    /// Signs a token for `principal`, valid from now for the configured TTL.
    pub fn generate(
        &self,
        principal: Principal,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), AppError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::configuration("Token expiry is past the supported date range"))?;

        let claims = Claims {
            sub: principal.id,
            role: principal.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok((token, claims))
    }
}
