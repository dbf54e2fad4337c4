//! Convenience result alias used across imrelay crates.

use crate::error::AppError;

/// Standard result type for imrelay operations.
pub type AppResult<T> = Result<T, AppError>;
