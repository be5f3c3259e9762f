//! Process-wide HMAC signing key.
//!
//! One key signs and verifies every token for the lifetime of the process.
//! It comes from `auth.jwt_secret`; when that is empty a random key is
//! generated once at startup, which invalidates all outstanding tokens on
//! restart. Rotating the key means restarting with a new secret.

use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::warn;

use aquahub_core::config::AuthConfig;

const GENERATED_KEY_LEN: usize = 32;

/// Shared HMAC-SHA256 key material.
#[derive(Clone)]
pub struct SigningKey {
    secret: Arc<[u8]>,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("len", &self.secret.len())
            .finish()
    }
}

impl SigningKey {
    /// Builds the key from configuration, generating one if none is set.
    pub fn from_config(config: &AuthConfig) -> Self {
        if config.jwt_secret.is_empty() {
            warn!("auth.jwt_secret is not set, using a random signing key for this process");
            Self::generate()
        } else {
            Self::from_secret(config.jwt_secret.as_bytes())
        }
    }

    /// Uses the given secret bytes.
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            secret: Arc::from(secret),
        }
    }

    /// Generates a fresh random key.
    pub fn generate() -> Self {
        let bytes: [u8; GENERATED_KEY_LEN] = rand::random();
        Self::from_secret(&bytes)
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}
