//! # shopauth-database
//!
//! Credential repository implementations for ShopAuth: PostgreSQL via
//! sqlx, an in-memory store for development and tests, and a caching
//! decorator over either.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{CachedCredentialRepository, InMemoryCredentialRepository, PgCredentialRepository};
