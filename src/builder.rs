//! Builder API for creating cache instances.
//!
//! This module provides a convenient way to assemble a `LazyCache` from its
//! fetchers, timing configuration and optional metrics sink.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::LazyCache;
use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::fetcher::{Fetcher, GroupFetcher};
use crate::metrics::MetricsSink;
use crate::strategy::FetchStrategy;

/// Builder for creating cache instances.
///
/// At least one of `fetcher` or `group_fetcher` must be supplied. When both
/// are, the group fetcher drives refreshes and the single-key fetcher is the
/// fallback.
///
/// # Example
///
/// ```ignore
/// use lazy_cache::{CacheBuilder, CacheConfig};
///
/// let cache = CacheBuilder::new()
///     .config(CacheConfig::from_env())
///     .group_fetcher(load_all_users)
///     .fetcher(load_one_user)
///     .build()?;
///
/// let user = cache.get("chronark").await;
/// ```
pub struct CacheBuilder<V> {
    ttl: Duration,
    capacity: usize,
    coalesce_refreshes: bool,
    single: Option<Arc<dyn Fetcher<V>>>,
    group: Option<Arc<dyn GroupFetcher<V>>>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl<V> CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new CacheBuilder with default configuration.
    pub fn new() -> Self {
        let defaults = CacheConfig::default();
        CacheBuilder {
            ttl: defaults.ttl(),
            capacity: defaults.capacity,
            coalesce_refreshes: defaults.coalesce_refreshes,
            single: None,
            group: None,
            metrics: None,
        }
    }

    /// Apply every setting from a `CacheConfig`.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.ttl = config.ttl();
        self.capacity = config.capacity;
        self.coalesce_refreshes = config.coalesce_refreshes;
        self
    }

    /// Time after a write before an entry goes stale.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Initial map capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Allow at most one background refresh per key at a time.
    pub fn coalesce_refreshes(mut self, coalesce: bool) -> Self {
        self.coalesce_refreshes = coalesce;
        self
    }

    /// Set the single-key fetcher.
    pub fn fetcher(mut self, fetcher: impl Fetcher<V> + 'static) -> Self {
        self.single = Some(Arc::new(fetcher));
        self
    }

    /// Set the group fetcher.
    pub fn group_fetcher(mut self, group: impl GroupFetcher<V> + 'static) -> Self {
        self.group = Some(Arc::new(group));
        self
    }

    /// Send metrics for reads, fetches and swaps to `sink`.
    pub fn metrics(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Build the cache.
    ///
    /// Fails with `CacheError::NoFetcher` when no fetcher was supplied.
    pub fn build(self) -> Result<LazyCache<V>, CacheError> {
        let strategy =
            FetchStrategy::from_parts(self.single, self.group).ok_or(CacheError::NoFetcher)?;

        Ok(LazyCache::assemble(
            strategy,
            self.ttl,
            self.capacity,
            self.coalesce_refreshes,
            self.metrics,
        ))
    }
}

impl<V> Default for CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
