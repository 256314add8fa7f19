//! Per-entry expiration for moka caches.

use std::time::{Duration, Instant};

use moka::Expiry;

/// A cached value together with the TTL it was written with.
#[derive(Debug, Clone)]
pub struct Expiring<V> {
    /// The stored value.
    pub value: V,
    /// Time to live measured from the last write.
    pub ttl: Duration,
}

impl<V> Expiring<V> {
    /// Wrap a value with its TTL.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self { value, ttl }
    }
}

/// Expires each entry after the TTL it was last written with.
///
/// Reads never extend an entry's life.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerEntryExpiry;

impl<V> Expiry<String, Expiring<V>> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Expiring<V>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Expiring<V>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}
