//! Redis-backed session store.

pub mod operations;

pub use operations::RedisCacheProvider;
