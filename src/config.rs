//! Cache configuration, loadable from JSON or environment variables.

use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::error::CacheError;

const DEFAULT_TTL_MS: u64 = 60_000;

/// Configuration for a `LazyCache`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time in milliseconds after a write before an entry goes stale.
    pub ttl_ms: u64,

    /// Initial map capacity. An allocation hint only; nothing is ever evicted.
    pub capacity: usize,

    /// Allow at most one background refresh per key at a time.
    pub coalesce_refreshes: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_ms: DEFAULT_TTL_MS,
            capacity: 0,
            coalesce_refreshes: false,
        }
    }
}

impl CacheConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CacheError> {
        serde_json::from_str(json).map_err(|e| CacheError::Config(e.to_string()))
    }

    /// Load from `LAZY_CACHE_TTL_MS`, `LAZY_CACHE_CAPACITY` and
    /// `LAZY_CACHE_COALESCE`, falling back to defaults for unset or
    /// unparseable values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        CacheConfig {
            ttl_ms: lookup("LAZY_CACHE_TTL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ttl_ms),
            capacity: lookup("LAZY_CACHE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capacity),
            coalesce_refreshes: lookup("LAZY_CACHE_COALESCE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.coalesce_refreshes),
        }
    }

    /// The TTL as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
