//! # shopauth-auth
//!
//! The authentication and session core of ShopAuth.
//!
//! ## Modules
//!
//! - `password`: hash scheme classification, bcrypt hashing, legacy digest
//!   verification and migration, new-password policy
//! - `jwt`: HS256 token issuance, validation, refresh, and unverified peeking
//! - `session`: TTL-bound session records and the per-user session index
//! - `orchestrator`: the login / refresh / logout protocol composed from the above
//! - `deadline`: caller-supplied deadlines for any core operation

pub mod deadline;
pub mod error;
pub mod jwt;
pub mod orchestrator;
pub mod password;
pub mod session;

pub use deadline::with_deadline;
pub use error::{AuthError, AuthResult};
pub use jwt::{AccessClaims, Identity, IssuedToken, JwtDecoder, JwtEncoder, TokenIssuer};
pub use orchestrator::{LoginOrchestrator, LoginOutcome, RefreshOutcome};
pub use password::{HashScheme, PasswordAuthenticator, PasswordPolicy, Verification};
pub use session::{Session, SessionStore};
