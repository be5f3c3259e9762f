//! WebSocket upgrade handler.
//!
//! The socket is push-only: every relayed payload goes out as a text
//! frame, and client text frames are ignored.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use aquahub_core::error::AppError;
use aquahub_core::types::Principal;

use crate::dto::WsQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /ws?token={jwt}
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::authentication("Missing token"))?;
    let principal = state.tokens.authenticate(&token).await?.principal();

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, principal, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, principal: Principal, mut socket: WebSocket) {
    let (conn_id, mut outbound_rx) = match state.relay.handle_connect(principal).await {
        Ok(registered) => registered,
        Err(e) => {
            warn!(principal = %principal, error = %e, "Closing socket, relay unavailable");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::ERROR,
                    reason: "relay unavailable".into(),
                })))
                .await;
            return;
        }
    };

    info!(conn_id = %conn_id, principal = %principal, "WebSocket connection established");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // Ends when the registry drops the handle or the client goes away.
    let mut outbound_task = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    loop {
        tokio::select! {
            _ = &mut outbound_task => break,
            inbound = ws_rx.next() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Text(_))) => {
                    debug!(conn_id = %conn_id, "Ignoring client text frame");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    // Cleanup
    outbound_task.abort();
    state.relay.handle_disconnect(conn_id).await;

    info!(conn_id = %conn_id, principal = %principal, "WebSocket connection closed");
}
