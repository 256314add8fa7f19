//! # shopauth-api
//!
//! HTTP boundary for ShopAuth built on Axum.
//!
//! Maps every orchestrator operation onto a route under `/api/v2/auth`,
//! extracts bearer tokens and client details, and turns `AuthError`s
//! into status codes and JSON bodies.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
