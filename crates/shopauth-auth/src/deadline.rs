//! Caller-supplied deadlines for core operations.
//!
//! Every state transition in the core is independently meaningful and
//! TTL-bound, so abandoning a future half-way leaves nothing to undo: a
//! session created before the deadline fired simply expires.

use std::future::Future;
use std::time::Duration;

use crate::error::AuthResult;

/// Run `fut` and fail with `DeadlineExceeded` if it does not finish within `limit`.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::time::timeout(limit, fut).await?
}
