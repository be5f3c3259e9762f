//! Convenience result type alias for AquaHub.

use crate::error::AppError;

/// A specialized `Result` type for AquaHub operations.
pub type AppResult<T> = Result<T, AppError>;
