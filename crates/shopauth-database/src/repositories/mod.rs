//! Concrete `CredentialRepository` implementations.

pub mod cached;
pub mod credential;
pub mod memory;

pub use cached::CachedCredentialRepository;
pub use credential::PgCredentialRepository;
pub use memory::InMemoryCredentialRepository;
