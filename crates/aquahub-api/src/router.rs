//! Route definitions for the AquaHub HTTP API.
//!
//! REST routes are mounted under `/api`; the relay socket lives at `/ws`.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().merge(auth_routes()).merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Session endpoints
fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", post(handlers::auth::logout))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
