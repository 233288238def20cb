use std::time::Duration;
use tokio::time::Instant;

/// A cache entry containing a value and its expiration time.
///
/// The value is optional: a fetch that succeeds without producing a value is
/// cached as an absent entry and expires like any other.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The cached value, `None` when the last successful fetch found nothing.
    pub value: Option<V>,

    /// After this instant the entry is stale and a read triggers a refresh.
    pub expires: Instant,
}

impl<V> Entry<V> {
    /// Create an entry that expires `ttl` after `now`.
    pub fn new(value: Option<V>, now: Instant, ttl: Duration) -> Self {
        Entry {
            value,
            expires: now + ttl,
        }
    }

    /// Overwrite the value in place and restart the staleness clock.
    pub fn refresh(&mut self, value: Option<V>, now: Instant, ttl: Duration) {
        self.value = value;
        self.expires = now + ttl;
    }

    /// Check if the entry is stale.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires
    }
}
