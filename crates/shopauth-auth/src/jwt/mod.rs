//! JWT token encoding, decoding, and claims management.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod issuer;

pub use claims::{AccessClaims, Identity};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder};
pub use issuer::TokenIssuer;
