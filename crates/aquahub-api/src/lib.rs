//! # aquahub-api
//!
//! HTTP API layer for AquaHub built on Axum.
//!
//! Provides the WebSocket relay upgrade, the logout endpoint, the health
//! check, CORS, request tracing, and error mapping.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
