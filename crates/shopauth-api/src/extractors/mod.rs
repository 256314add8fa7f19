//! Custom Axum extractors.

pub mod auth;
pub mod client;

pub use auth::{AuthUser, BearerToken};
pub use client::ClientInfo;
