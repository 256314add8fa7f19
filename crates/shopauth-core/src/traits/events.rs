//! Observability port for the authentication core.

use crate::events::AuthEvent;

/// Receives security events from the components it is injected into.
///
/// `emit` is synchronous and must not block: implementations either log,
/// buffer, or drop.
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record one event.
    fn emit(&self, event: AuthEvent);
}
