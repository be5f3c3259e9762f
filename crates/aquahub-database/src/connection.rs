//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use aquahub_core::config::DatabaseConfig;
use aquahub_core::error::{AppError, ErrorKind};
use aquahub_core::result::AppResult;

/// Query pool shared by the repositories and the notification listener.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(&config.url)?;
        info!(
            target: "aquahub::database",
            host = options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!(target: "aquahub::database", "Database connected");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trips `SELECT 1`.
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!(target: "aquahub::database", "Database pool closed");
    }
}

/// Parses the URL up front so a malformed one is reported as configuration,
/// and so logs can name the server without the credentials.
fn connect_options(url: &str) -> AppResult<PgConnectOptions> {
    url.parse::<PgConnectOptions>().map_err(|e| {
        AppError::with_source(
            ErrorKind::Configuration,
            "database.url is not a valid PostgreSQL URL",
            e,
        )
    })
}
