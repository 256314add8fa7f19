//! # shopauth-cache
//!
//! Key/value backends for ShopAuth. The same provider stores session
//! records, the per-user session index, and (optionally) cached
//! credentials.
//!
//! - **memory**: In-process store using [moka](https://crates.io/crates/moka)
//!   with per-entry TTLs and [dashmap](https://crates.io/crates/dashmap) sets
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod credential;
pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use credential::{NoopCredentialCache, StoreCredentialCache, build_credential_cache};
#[cfg(feature = "memory")]
pub use credential::MemoryCredentialCache;
pub use provider::CacheManager;
