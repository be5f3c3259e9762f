//! AquaHub Server: water-refilling marketplace backend core
//!
//! Main entry point that wires the relay, token directory, and HTTP API
//! together and starts the server.

mod logging;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use aquahub_api::{AppState, build_router};
use aquahub_auth::TokenDirectory;
use aquahub_core::config::AppConfig;
use aquahub_core::error::AppError;
use aquahub_database::{AuthenticationRepository, DatabasePool, ListenerTask};
use aquahub_realtime::RelayService;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guards = match logging::init(&config.logging) {
        Ok(guards) => guards,
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(severity = "critical", error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("AQUAHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AquaHub v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    aquahub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Token directory ──────────────────────────────────
    let token_store = Arc::new(AuthenticationRepository::new(db.pool().clone()));
    let tokens = Arc::new(TokenDirectory::new(&config.auth, token_store)?);

    // ── Step 3: Notification listener ────────────────────────────
    let (notify_tx, notify_rx) = mpsc::channel(config.realtime.notification_buffer_size.max(1));
    let (listener, listen_handle) = ListenerTask::connect(
        db.pool(),
        notify_tx,
        Duration::from_secs(config.realtime.listener_retry_seconds),
    )
    .await
    .inspect_err(|e| {
        tracing::error!(severity = "critical", error = %e, "Notification listener unavailable");
    })?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener_task = tokio::spawn(listener.run(shutdown_rx));

    // ── Step 4: Relay service ────────────────────────────────────
    let relay = Arc::new(RelayService::new(
        config.realtime.clone(),
        Arc::new(listen_handle),
    ));
    let fanout_task = relay.spawn_fanout(notify_rx);

    if config.realtime.listen_on_startup {
        relay.pin_channels().await.inspect_err(|e| {
            tracing::error!(severity = "critical", error = %e, "Failed to listen on startup channels");
        })?;
    }

    // ── Step 5: Build and start HTTP server ──────────────────────
    let state = AppState::new(config.clone(), tokens, relay.clone(), Some(db.clone()));
    let app = build_router(state);

    let addr = config.server.bind_address();
    let tcp = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!("AquaHub server listening on {}", addr);

    // ── Step 6: Graceful shutdown ────────────────────────────────
    // Closing the relay ends the upgraded sockets, which graceful
    // shutdown would otherwise wait on.
    let relay_for_shutdown = relay.clone();
    axum::serve(tcp, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            relay_for_shutdown.shutdown().await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let _ = shutdown_tx.send(true);

    // ── Step 7: Wait for background tasks ────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, async {
        let _ = fanout_task.await;
        let _ = listener_task.await;
    })
    .await
    .is_err()
    {
        tracing::warn!("Background tasks did not stop within the grace period");
    }

    db.close().await;
    tracing::info!("AquaHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
