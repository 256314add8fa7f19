//! In-process backends built on moka.

pub mod expiry;
pub mod store;

pub use expiry::{Expiring, PerEntryExpiry};
pub use store::MemoryCacheProvider;
