//! Maps `AuthError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use shopauth_auth::AuthError;
use shopauth_core::error::ErrorKind;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Every failure a handler can return.
#[derive(Debug)]
pub enum ApiError {
    /// The core refused the request.
    Auth(AuthError),
    /// No usable `Authorization: Bearer` header.
    MissingToken,
    /// The request was well-formed but cannot be served as asked.
    BadRequest(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl ApiError {
    /// Status code, error code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "MISSING_TOKEN",
                "No token provided".to_string(),
            ),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", message.clone())
            }
            Self::Auth(err) => {
                let status = match err.kind() {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::Authentication | ErrorKind::Session => StatusCode::UNAUTHORIZED,
                    ErrorKind::Authorization => StatusCode::FORBIDDEN,
                    ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                    ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
                    "Internal server error".to_string()
                } else {
                    err.to_string()
                };
                (status, err.code(), message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = ?self, status = status.as_u16(), "Request failed");
        }

        let body = ApiErrorResponse {
            success: false,
            error: code.to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
