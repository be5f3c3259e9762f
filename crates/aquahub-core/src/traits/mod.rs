//! Seam traits implemented by infrastructure crates.

pub mod listener;
pub mod token_store;

pub use listener::ListenCommander;
pub use token_store::TokenStore;
