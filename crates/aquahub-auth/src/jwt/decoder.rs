//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use aquahub_core::error::AppError;

use super::claims::Claims;
use super::key::SigningKey;

/// Verifies token signatures and expiry.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC key for verification.
    decoding_key: DecodingKey,
    /// Validation with expiry checks.
    validation: Validation,
    /// Validation that accepts expired tokens (logout only).
    lenient: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder.
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // clock skew

        let mut lenient = validation.clone();
        lenient.validate_exp = false;

        Self {
            decoding_key: key.decoding_key(),
            validation,
            lenient,
        }
    }

    /// Decodes a token, checking signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &self.validation)
    }

    /// Decodes a token, checking the signature but not the expiry.
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_with(token, &self.lenient)
    }

    fn decode_with(&self, token: &str, validation: &Validation) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::invalid_token("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::invalid_token("Invalid token signature")
                }
                _ => AppError::invalid_token("Invalid token format"),
            })
    }
}
