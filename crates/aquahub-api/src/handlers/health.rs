//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.db {
        Some(pool) => match pool.health_check().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "unavailable"
            }
        },
        None => "disabled",
    };
    let status = if database == "unavailable" { "degraded" } else { "ok" };

    Json(HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        connections: state.relay.connection_count(),
        active_channels: state.relay.active_channels().await,
        metrics: state.relay.metrics(),
    })
}
