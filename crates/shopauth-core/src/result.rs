//! Convenience result type alias for ShopAuth.

use crate::error::AppError;

/// A specialized `Result` type for infrastructure operations.
///
/// Cache backends, repositories and the configuration loader all return
/// this so callers can propagate with `?` without naming the error type.
pub type AppResult<T> = Result<T, AppError>;
