//! Security events emitted by the authentication core.
//!
//! Components never log security-relevant outcomes directly. They hand an
//! [`AuthEvent`] to the [`EventSink`](crate::traits::EventSink) they were
//! constructed with, which decides whether the event becomes a log line,
//! an audit record, or nothing at all.

pub mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use sink::{MemoryEventSink, NoopEventSink, TracingEventSink};

/// Server-side reason a login attempt was refused.
///
/// The caller only ever sees the coarse authentication error; this detail
/// stays in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginFailure {
    /// No account matches the supplied email.
    UnknownAccount,
    /// The account exists but the password did not verify.
    WrongPassword,
    /// The password verified but the account is deactivated.
    InactiveAccount,
}

impl fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAccount => write!(f, "unknown_account"),
            Self::WrongPassword => write!(f, "wrong_password"),
            Self::InactiveAccount => write!(f, "inactive_account"),
        }
    }
}

/// A security-relevant happening inside the authentication core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    /// Credentials verified and a session was opened.
    LoginSucceeded {
        /// The user ID.
        user_id: String,
        /// The new session ID.
        session_id: String,
        /// Client address as reported by the boundary.
        ip_address: String,
    },
    /// A login attempt was refused.
    LoginFailed {
        /// The email the caller supplied.
        email: String,
        /// Why it failed.
        reason: LoginFailure,
    },
    /// A legacy hash was replaced with a current-scheme hash.
    PasswordMigrated {
        /// The user ID.
        user_id: String,
        /// Scheme the old hash used.
        from_scheme: String,
    },
    /// Rehashing or persisting a migrated hash failed. The login still succeeded.
    PasswordMigrationFailed {
        /// The user ID.
        user_id: String,
        /// Error description.
        error: String,
    },
    /// A legacy hash was presented while legacy verification is disabled.
    LegacyVerificationRefused {
        /// Scheme of the refused hash.
        scheme: String,
    },
    /// A user changed their password.
    PasswordChanged {
        /// The user ID.
        user_id: String,
    },
    /// Recording the last-login timestamp failed.
    LastLoginUpdateFailed {
        /// The user ID.
        user_id: String,
        /// Error description.
        error: String,
    },
    /// A session record was written.
    SessionCreated {
        /// The session ID.
        session_id: String,
        /// The user ID.
        user_id: String,
    },
    /// A session's expiry was pushed forward.
    SessionRefreshed {
        /// The session ID.
        session_id: String,
    },
    /// A session was marked inactive.
    SessionRevoked {
        /// The session ID.
        session_id: String,
    },
    /// A session record was removed.
    SessionDeleted {
        /// The session ID.
        session_id: String,
    },
    /// Every session of a user was removed.
    SessionsPurged {
        /// The user ID.
        user_id: String,
        /// Number of sessions removed.
        count: usize,
    },
    /// A dead id was dropped from a user's session index.
    SessionIndexPruned {
        /// The user ID.
        user_id: String,
        /// The pruned session ID.
        session_id: String,
    },
    /// A signed token was issued.
    TokenIssued {
        /// The user ID.
        user_id: String,
        /// Session the token is bound to.
        session_id: String,
    },
    /// A token was exchanged for a fresh one.
    TokenRefreshed {
        /// The user ID.
        user_id: String,
        /// Session the token is bound to.
        session_id: String,
    },
    /// A presented token failed validation.
    TokenRejected {
        /// Error description.
        reason: String,
    },
}

impl AuthEvent {
    /// Short machine-readable name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginSucceeded { .. } => "login_succeeded",
            Self::LoginFailed { .. } => "login_failed",
            Self::PasswordMigrated { .. } => "password_migrated",
            Self::PasswordMigrationFailed { .. } => "password_migration_failed",
            Self::LegacyVerificationRefused { .. } => "legacy_verification_refused",
            Self::PasswordChanged { .. } => "password_changed",
            Self::LastLoginUpdateFailed { .. } => "last_login_update_failed",
            Self::SessionCreated { .. } => "session_created",
            Self::SessionRefreshed { .. } => "session_refreshed",
            Self::SessionRevoked { .. } => "session_revoked",
            Self::SessionDeleted { .. } => "session_deleted",
            Self::SessionsPurged { .. } => "sessions_purged",
            Self::SessionIndexPruned { .. } => "session_index_pruned",
            Self::TokenIssued { .. } => "token_issued",
            Self::TokenRefreshed { .. } => "token_refreshed",
            Self::TokenRejected { .. } => "token_rejected",
        }
    }

    /// Whether the event reports something an operator should look at.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::LoginFailed { .. }
                | Self::PasswordMigrationFailed { .. }
                | Self::LegacyVerificationRefused { .. }
                | Self::LastLoginUpdateFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_type_tag() {
        let event = AuthEvent::LoginFailed {
            email: "a@x.com".to_string(),
            reason: LoginFailure::WrongPassword,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "login_failed");
        assert_eq!(json["reason"], "wrong_password");
        assert_eq!(event.name(), "login_failed");
    }

    #[test]
    fn test_warning_classification() {
        assert!(
            AuthEvent::LastLoginUpdateFailed {
                user_id: "u".into(),
                error: "db down".into(),
            }
            .is_warning()
        );
        assert!(
            !AuthEvent::SessionDeleted {
                session_id: "s".into(),
            }
            .is_warning()
        );
    }
}
