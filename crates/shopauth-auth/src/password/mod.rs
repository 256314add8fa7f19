//! Password hashing, verification, migration, and policy.

pub mod authenticator;
pub mod policy;
pub mod scheme;

pub use authenticator::{PasswordAuthenticator, Verification};
pub use policy::PasswordPolicy;
pub use scheme::HashScheme;
