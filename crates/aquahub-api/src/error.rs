//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use aquahub_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler error wrapper so `AppError` can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, error_code) = match err.kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ErrorKind::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            ErrorKind::Listen => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            ErrorKind::Database
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %err, "Internal server error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse {
                        error: "INTERNAL_ERROR".to_string(),
                        message: "An internal error occurred".to_string(),
                    }),
                )
                    .into_response();
            }
        };

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: err.message,
        };

        (status, Json(body)).into_response()
    }
}
