//! # aquahub-auth
//!
//! Session tokens for the AquaHub platform.
//!
//! ## Modules
//!
//! - `jwt`: signing key lifecycle, claims, token encoding and decoding
//! - `token`: the [`TokenDirectory`] (issue, validate, revoke) and an
//!   in-memory [`TokenStore`](aquahub_core::traits::TokenStore)

pub mod jwt;
pub mod token;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, SigningKey};
pub use token::{IssuedToken, MemoryTokenStore, TokenDirectory};
