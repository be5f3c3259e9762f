//! Repository implementations.

pub mod authentication;

pub use authentication::AuthenticationRepository;
