//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Session token signing configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Process-wide HMAC-SHA256 signing secret.
    ///
    /// When empty, a random key is generated at startup and tokens do not
    /// survive a restart.
    #[serde(default)]
    pub jwt_secret: String,
    /// Token validity window in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"****")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

fn default_token_ttl() -> u64 {
    60
}
