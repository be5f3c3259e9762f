//! Application state shared across all handlers.

use std::sync::Arc;

use aquahub_auth::TokenDirectory;
use aquahub_core::config::AppConfig;
use aquahub_database::DatabasePool;
use aquahub_realtime::RelayService;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session token directory
    pub tokens: Arc<TokenDirectory>,
    /// Notification relay
    pub relay: Arc<RelayService>,
    /// PostgreSQL pool, absent when running on the in-memory token store
    pub db: Option<DatabasePool>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        tokens: Arc<TokenDirectory>,
        relay: Arc<RelayService>,
        db: Option<DatabasePool>,
    ) -> Self {
        Self {
            config,
            tokens,
            relay,
            db,
        }
    }
}
