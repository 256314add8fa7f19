//! Core traits defined in `shopauth-core` and implemented by other crates.

pub mod cache;
pub mod credential;
pub mod events;

pub use cache::CacheProvider;
pub use credential::{Credential, CredentialCache, CredentialRepository};
pub use events::EventSink;
