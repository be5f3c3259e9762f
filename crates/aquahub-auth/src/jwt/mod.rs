//! JWT signing key, claims, encoding, and decoding.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod key;

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;
pub use key::SigningKey;
