//! Token issuance, validation, and revocation.
//!
//! Each principal holds at most one active token. Issuing a new token
//! replaces the stored digest, so older tokens stop validating.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use aquahub_core::config::AuthConfig;
use aquahub_core::error::AppError;
use aquahub_core::result::AppResult;
use aquahub_core::traits::TokenStore;
use aquahub_core::types::{Principal, Role, SessionToken};

use crate::jwt::{Claims, JwtDecoder, JwtEncoder, SigningKey};

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// The signed token string handed to the client.
    pub token: String,
    /// When the token stops validating.
    pub expires_at: DateTime<Utc>,
}

/// Lowercase hex SHA-256 digest of a token string.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn digests_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// One-token-per-principal directory over a [`TokenStore`].
#[derive(Debug, Clone)]
pub struct TokenDirectory {
    store: Arc<dyn TokenStore>,
    encoder: JwtEncoder,
    decoder: JwtDecoder,
}

impl TokenDirectory {
    /// Creates a directory using the configured signing secret and TTL.
    pub fn new(config: &AuthConfig, store: Arc<dyn TokenStore>) -> AppResult<Self> {
        let key = SigningKey::from_config(config);
        Self::with_key(&key, config.token_ttl_minutes, store)
    }

    /// Creates a directory with an explicit signing key.
    pub fn with_key(
        key: &SigningKey,
        ttl_minutes: u64,
        store: Arc<dyn TokenStore>,
    ) -> AppResult<Self> {
        Ok(Self {
            store,
            encoder: JwtEncoder::new(key, ttl_minutes)?,
            decoder: JwtDecoder::new(key),
        })
    }

    /// Signs a new token for the principal and makes it the only valid one.
    pub async fn issue(&self, principal_id: i64, role: Role) -> AppResult<IssuedToken> {
        let principal = Principal::new(principal_id, role);
        let now = Utc::now();
        let (token, claims) = self.encoder.generate(principal, now)?;

        self.store
            .upsert(&SessionToken {
                principal,
                token_hash: hash_token(&token),
                issued_at: now,
            })
            .await?;

        info!(principal = %principal, "Session token issued");

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Revokes the principal's token if `token` is the one currently stored.
    ///
    /// Fails with `InvalidToken` when there is no record, when the stored
    /// digest differs, or when a concurrent issue replaced the record
    /// between the check and the delete.
    pub async fn revoke(&self, principal: &Principal, token: &str) -> AppResult<()> {
        let presented = hash_token(token);

        let record = self
            .store
            .find(principal)
            .await?
            .ok_or_else(|| AppError::invalid_token("No active session for this account"))?;

        if !digests_match(&record.token_hash, &presented) {
            warn!(principal = %principal, "Logout with a token that is not the active one");
            return Err(AppError::invalid_token("Token does not match the active session"));
        }

        if !self.store.delete_matching(principal, &presented).await? {
            warn!(principal = %principal, "Session replaced during logout");
            return Err(AppError::invalid_token("Token does not match the active session"));
        }

        info!(principal = %principal, "Session token revoked");
        Ok(())
    }

    /// Checks that `token` is validly signed, unexpired, issued to
    /// `principal`, and still the principal's active token.
    pub async fn validate(&self, principal: &Principal, token: &str) -> AppResult<Claims> {
        let claims = self.decoder.decode(token)?;

        if claims.principal() != *principal {
            return Err(AppError::invalid_token("Token was issued to another account"));
        }

        let record = self
            .store
            .find(principal)
            .await?
            .ok_or_else(|| AppError::invalid_token("No active session for this account"))?;

        if !digests_match(&record.token_hash, &hash_token(token)) {
            debug!(principal = %principal, "Superseded token presented");
            return Err(AppError::invalid_token("Token has been superseded"));
        }

        Ok(claims)
    }

    /// Validates a bare token against the principal embedded in it.
    pub async fn authenticate(&self, token: &str) -> AppResult<Claims> {
        let principal = self.decoder.decode(token)?.principal();
        self.validate(&principal, token).await
    }

    /// Reads the principal from a correctly signed token, expired or not.
    pub fn principal_of(&self, token: &str) -> AppResult<Principal> {
        Ok(self.decoder.decode_ignoring_expiry(token)?.principal())
    }
}
