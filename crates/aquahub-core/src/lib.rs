//! # aquahub-core
//!
//! Core crate for the AquaHub backend. Contains configuration schemas,
//! principal and notification types, the seam traits implemented by the
//! database layer (token persistence, listen commands), and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other AquaHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
