//! # shopauth-core
//!
//! Core crate for ShopAuth. Contains the configuration schema, the
//! authentication event vocabulary, the traits implemented by the cache
//! and database crates, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ShopAuth crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
