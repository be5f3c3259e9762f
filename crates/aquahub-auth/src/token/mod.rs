//! One-token-per-principal session directory.

pub mod directory;
pub mod memory;

pub use directory::{IssuedToken, TokenDirectory, hash_token};
pub use memory::MemoryTokenStore;
