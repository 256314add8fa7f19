//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use shopauth_auth::LoginOrchestrator;
use shopauth_core::config::ServerConfig;

/// Shared dependencies passed to every handler via `State<AppState>`.
///
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The authentication core.
    pub orchestrator: Arc<LoginOrchestrator>,
    /// Deadline applied to each core call.
    pub request_timeout: Duration,
}

impl AppState {
    /// Bundle the orchestrator with the server's request deadline.
    pub fn new(server: &ServerConfig, orchestrator: Arc<LoginOrchestrator>) -> Self {
        Self {
            orchestrator,
            request_timeout: Duration::from_secs(server.request_timeout_seconds),
        }
    }
}
