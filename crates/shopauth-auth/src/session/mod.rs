//! Server-side sessions: TTL-bound records plus a per-user index.

pub mod model;
pub mod store;

pub use model::Session;
pub use store::SessionStore;
