//! Auth handlers: login, logout, refresh, validate, sessions, password.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;

use shopauth_auth::with_deadline;

use crate::dto::request::{ChangePasswordRequest, LoginRequest};
use crate::dto::response::{
    LoginResponse, MessageResponse, RefreshTokenResponse, SessionsResponse, ValidateTokenResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, BearerToken, ClientInfo};
use crate::state::AppState;

/// POST /api/v2/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    info!(email = %req.email, ip_address = %client.ip_address, "Login attempt");

    let outcome = with_deadline(
        state.request_timeout,
        state
            .orchestrator
            .login(&req.email, &req.password, &client.ip_address, &client.user_agent),
    )
    .await?;

    Ok(Json(LoginResponse {
        success: true,
        expires_at: outcome.token.expires_at(),
        token: outcome.token.token,
        session_id: outcome.session.id,
        user: outcome.user.into(),
    }))
}

/// POST /api/v2/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    let session_id = auth
        .claims
        .session_id()
        .ok_or_else(|| ApiError::BadRequest("No session found".to_string()))?;

    info!(session_id = %session_id, "Logout");
    with_deadline(state.request_timeout, state.orchestrator.logout(session_id)).await?;

    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

/// POST /api/v2/auth/logout/all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    info!(user_id = %auth.claims.user_id, "Logout all");
    with_deadline(
        state.request_timeout,
        state.orchestrator.logout_all(&auth.claims.user_id),
    )
    .await?;

    Ok(Json(MessageResponse::ok("All sessions terminated")))
}

/// POST /api/v2/auth/refresh
///
/// Takes the current token, expired or not, from the `Authorization` header.
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<RefreshTokenResponse>, ApiError> {
    let outcome = with_deadline(state.request_timeout, state.orchestrator.refresh_token(&token))
        .await?;

    Ok(Json(RefreshTokenResponse {
        success: true,
        expires_at: outcome.token.expires_at(),
        token: outcome.token.token,
    }))
}

/// POST /api/v2/auth/validate
pub async fn validate(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ValidateTokenResponse>, ApiError> {
    let claims = with_deadline(
        state.request_timeout,
        state.orchestrator.validate_access(&token),
    )
    .await?;

    Ok(Json(ValidateTokenResponse {
        success: true,
        valid: true,
        claims,
    }))
}

/// GET /api/v2/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = with_deadline(
        state.request_timeout,
        state.orchestrator.list_sessions(&auth.claims.user_id),
    )
    .await?;

    Ok(Json(SessionsResponse {
        success: true,
        sessions,
    }))
}

/// DELETE /api/v2/auth/sessions/{id}
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    info!(user_id = %auth.claims.user_id, session_id = %session_id, "Revoke session");
    with_deadline(
        state.request_timeout,
        state
            .orchestrator
            .revoke_user_session(&auth.claims.user_id, &session_id),
    )
    .await?;

    Ok(Json(MessageResponse::ok("Session revoked")))
}

/// PUT /api/v2/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    with_deadline(
        state.request_timeout,
        state.orchestrator.change_password(
            &auth.claims.user_id,
            &req.current_password,
            &req.new_password,
        ),
    )
    .await?;

    Ok(Json(MessageResponse::ok("Password changed")))
}
