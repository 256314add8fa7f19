//! Route definitions for the ShopAuth HTTP API.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v2/auth", auth_routes())
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Login, logout, token, session, and password endpoints.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/logout/all", post(handlers::auth::logout_all))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/validate", post(handlers::auth::validate))
        .route("/sessions", get(handlers::auth::list_sessions))
        .route("/sessions/{id}", delete(handlers::auth::revoke_session))
        .route("/password", put(handlers::auth::change_password))
}
