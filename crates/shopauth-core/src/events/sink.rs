//! Event sink implementations.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::AuthEvent;
use crate::traits::EventSink;

/// Renders every event as a structured `tracing` record.
///
/// This is the sink the server wires in by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: AuthEvent) {
        let name = event.name();
        match &event {
            AuthEvent::LoginSucceeded {
                user_id,
                session_id,
                ip_address,
            } => info!(event = name, user_id = %user_id, session_id = %session_id, ip = %ip_address, "Login succeeded"),
            AuthEvent::LoginFailed { email, reason } => {
                warn!(event = name, email = %email, reason = %reason, "Login failed")
            }
            AuthEvent::PasswordMigrated {
                user_id,
                from_scheme,
            } => info!(event = name, user_id = %user_id, from = %from_scheme, "Password hash migrated"),
            AuthEvent::PasswordMigrationFailed { user_id, error } => {
                warn!(event = name, user_id = %user_id, error = %error, "Password migration failed")
            }
            AuthEvent::LegacyVerificationRefused { scheme } => {
                warn!(event = name, scheme = %scheme, "Legacy hash presented while legacy auth is disabled")
            }
            AuthEvent::PasswordChanged { user_id } => {
                info!(event = name, user_id = %user_id, "Password changed")
            }
            AuthEvent::LastLoginUpdateFailed { user_id, error } => {
                warn!(event = name, user_id = %user_id, error = %error, "Failed to record last login")
            }
            AuthEvent::SessionCreated {
                session_id,
                user_id,
            } => info!(event = name, session_id = %session_id, user_id = %user_id, "Session created"),
            AuthEvent::SessionRefreshed { session_id } => {
                debug!(event = name, session_id = %session_id, "Session refreshed")
            }
            AuthEvent::SessionRevoked { session_id } => {
                info!(event = name, session_id = %session_id, "Session revoked")
            }
            AuthEvent::SessionDeleted { session_id } => {
                info!(event = name, session_id = %session_id, "Session deleted")
            }
            AuthEvent::SessionsPurged { user_id, count } => {
                info!(event = name, user_id = %user_id, count = *count as u64, "All sessions deleted for user")
            }
            AuthEvent::SessionIndexPruned {
                user_id,
                session_id,
            } => debug!(event = name, user_id = %user_id, session_id = %session_id, "Pruned dead session from index"),
            AuthEvent::TokenIssued {
                user_id,
                session_id,
            } => debug!(event = name, user_id = %user_id, session_id = %session_id, "Token issued"),
            AuthEvent::TokenRefreshed {
                user_id,
                session_id,
            } => info!(event = name, user_id = %user_id, session_id = %session_id, "Token refreshed"),
            AuthEvent::TokenRejected { reason } => {
                debug!(event = name, reason = %reason, "Token rejected")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: AuthEvent) {}
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Mutex<Vec<AuthEvent>>,
}

impl MemoryEventSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Names of everything emitted so far.
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(AuthEvent::name).collect()
    }

    /// Whether an event with the given name was emitted.
    pub fn contains(&self, name: &str) -> bool {
        self.names().contains(&name)
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: AuthEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}
