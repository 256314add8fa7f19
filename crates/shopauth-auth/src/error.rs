//! Error taxonomy of the authentication core.

use thiserror::Error;

use shopauth_core::error::{AppError, ErrorKind};

/// Every way an authentication-core operation can fail.
///
/// Authentication failures are deliberately coarse: `InvalidCredentials`
/// covers both unknown accounts and wrong passwords. Token failures are
/// fine-grained so callers can tell "refresh it" from "log in again".
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password was empty.
    #[error("password cannot be empty")]
    PasswordEmpty,
    /// Password is shorter than the configured minimum.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length in bytes.
        min: usize,
    },
    /// Password is longer than the configured maximum.
    #[error("password cannot exceed {max} characters")]
    PasswordTooLong {
        /// Maximum length in bytes.
        max: usize,
    },
    /// Password is below the configured strength score.
    #[error("password is too weak")]
    PasswordTooWeak,
    /// The current password supplied to a password change did not verify.
    #[error("current password is incorrect")]
    PasswordMismatch,
    /// Hash computation failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Unknown email or wrong password.
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The account is deactivated.
    #[error("account is inactive")]
    AccountInactive,

    /// Bad signature, malformed token, or wrong algorithm.
    #[error("invalid token")]
    TokenInvalid,
    /// Signature is valid but `exp` has passed.
    #[error("token has expired")]
    TokenExpired,
    /// Signature is valid but `nbf` is in the future.
    #[error("token is not valid yet")]
    TokenNotYetValid,
    /// Signature is valid but required claims are missing or wrong.
    #[error("invalid token claims")]
    ClaimsInvalid,

    /// No session record under this id.
    #[error("session not found")]
    SessionNotFound,
    /// Session record outlived its `expires_at`.
    #[error("session has expired")]
    SessionExpired,
    /// Session record could not be decoded.
    #[error("session is invalid")]
    SessionInvalid,
    /// Session was revoked.
    #[error("session has been revoked")]
    SessionRevoked,

    /// The caller's deadline elapsed before the operation finished.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// A storage backend failed.
    #[error(transparent)]
    Backend(#[from] AppError),
}

/// A specialized `Result` type for authentication-core operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Coarse category used when the error leaves the core.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PasswordEmpty
            | Self::PasswordTooShort { .. }
            | Self::PasswordTooLong { .. }
            | Self::PasswordTooWeak
            | Self::PasswordMismatch => ErrorKind::Validation,
            Self::Hashing(_) => ErrorKind::Internal,
            Self::InvalidCredentials
            | Self::TokenInvalid
            | Self::TokenExpired
            | Self::TokenNotYetValid
            | Self::ClaimsInvalid => ErrorKind::Authentication,
            Self::AccountInactive => ErrorKind::Authorization,
            Self::SessionNotFound
            | Self::SessionExpired
            | Self::SessionInvalid
            | Self::SessionRevoked => ErrorKind::Session,
            Self::DeadlineExceeded => ErrorKind::Timeout,
            Self::Backend(err) => err.kind,
        }
    }

    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PasswordEmpty => "PASSWORD_EMPTY",
            Self::PasswordTooShort { .. } => "PASSWORD_TOO_SHORT",
            Self::PasswordTooLong { .. } => "PASSWORD_TOO_LONG",
            Self::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::Hashing(_) => "INTERNAL_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenNotYetValid => "TOKEN_NOT_YET_VALID",
            Self::ClaimsInvalid => "CLAIMS_INVALID",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::SessionInvalid => "SESSION_INVALID",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::Backend(_) => "SERVICE_ERROR",
        }
    }

    /// Whether this is one of the token failure kinds.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::TokenInvalid | Self::TokenExpired | Self::TokenNotYetValid | Self::ClaimsInvalid
        )
    }

    /// Whether this is one of the session failure kinds.
    pub fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound | Self::SessionExpired | Self::SessionInvalid | Self::SessionRevoked
        )
    }

    /// Whether the caller should try a token refresh rather than a new login.
    pub fn should_refresh(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Backend(inner) => inner,
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

impl From<tokio::time::error::Elapsed> for AuthError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::DeadlineExceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::PasswordTooShort { min: 8 }.kind(), ErrorKind::Validation);
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Authentication);
        assert_eq!(AuthError::AccountInactive.kind(), ErrorKind::Authorization);
        assert_eq!(AuthError::SessionRevoked.kind(), ErrorKind::Session);
        assert_eq!(AuthError::DeadlineExceeded.kind(), ErrorKind::Timeout);
        assert_eq!(
            AuthError::Backend(AppError::cache("down")).kind(),
            ErrorKind::Cache
        );
    }

    #[test]
    fn test_classification_helpers() {
        assert!(AuthError::TokenExpired.is_token_error());
        assert!(AuthError::TokenExpired.should_refresh());
        assert!(!AuthError::TokenInvalid.should_refresh());
        assert!(AuthError::SessionNotFound.is_session_error());
        assert!(!AuthError::InvalidCredentials.is_session_error());
    }

    #[test]
    fn test_into_app_error_keeps_backend_error() {
        let app: AppError = AuthError::Backend(AppError::database("pool closed")).into();
        assert_eq!(app.kind, ErrorKind::Database);
        assert_eq!(app.message, "pool closed");

        let app: AppError = AuthError::TokenExpired.into();
        assert_eq!(app.kind, ErrorKind::Authentication);
        assert_eq!(app.message, "token has expired");
    }
}
