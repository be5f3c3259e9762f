//! Auth handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use aquahub_core::error::AppError;
use aquahub_core::types::Principal;

use crate::dto::{LogoutRequest, MessageResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(req) =
        payload.map_err(|e| AppError::validation(format!("Invalid request body: {}", e.body_text())))?;

    let user_id = req
        .userid
        .ok_or_else(|| AppError::validation("Missing required field: userid"))?;
    let token = req
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("Missing required field: token"))?;

    let role = match req.role {
        Some(role) => role.into_role()?,
        None => state.tokens.principal_of(&token)?.role,
    };

    state
        .tokens
        .revoke(&Principal::new(user_id, role), &token)
        .await?;

    Ok(Json(MessageResponse::new("Logout successful!")))
}
