use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::builder::CacheBuilder;
use crate::entry::Entry;
use crate::error::CacheError;
use crate::fetcher::{Fetcher, GroupFetcher};
use crate::metrics::{CacheMetric, FetchOutcome, FetchSource, MetricsSink, ReadStatus, elapsed_ms};
use crate::strategy::FetchStrategy;

/// Everything guarded by the cache lock.
struct State<V> {
    items: HashMap<String, Entry<V>>,
    strategy: FetchStrategy<V>,
}

impl<V> State<V> {
    /// Store `value` for `key`, updating an existing entry in place.
    fn store(&mut self, key: &str, value: Option<V>, ttl: Duration) {
        let now = Instant::now();
        match self.items.get_mut(key) {
            Some(entry) => entry.refresh(value, now, ttl),
            None => {
                self.items.insert(key.to_string(), Entry::new(value, now, ttl));
            }
        }
    }
}

struct Inner<V> {
    state: RwLock<State<V>>,
    ttl: Duration,
    coalesce_refreshes: bool,
    /// Keys with a background refresh in flight, only tracked when coalescing.
    refreshing: Mutex<HashSet<String>>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl<V> Inner<V> {
    /// Mark `key` as refreshing. False when a refresh is already in flight.
    fn begin_refresh(&self, key: &str) -> bool {
        self.refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string())
    }

    fn end_refresh(&self, key: &str) {
        self.refreshing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Clears a refresh marker when dropped, including when the fetch panics.
struct RefreshMarker<V> {
    inner: Arc<Inner<V>>,
    key: String,
}

impl<V> Drop for RefreshMarker<V> {
    fn drop(&mut self) {
        self.inner.end_refresh(&self.key);
    }
}

/// A stale-while-revalidate cache.
///
/// Reads never wait on a fetch when an entry exists: a fresh entry is
/// returned as is, an expired one is returned immediately while a background
/// task refreshes it. Only a key with no entry at all is fetched in the
/// foreground.
///
/// Fetch errors never erase data. A fetch that succeeds without a value does:
/// it is cached as an absent entry and the key reads as not found until a
/// later fetch supplies a value.
///
/// `LazyCache` is a cheap handle; clones share the same entries and strategy.
///
/// # Example
/// ```ignore
/// let cache = LazyCache::new(
///     fetcher_fn(|key: String| async move { Ok::<_, BoxError>(db.find(&key).await?) }),
///     Duration::from_secs(30),
///     1024,
/// );
///
/// let user = cache.get("user:123").await;
/// ```
pub struct LazyCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for LazyCache<V> {
    fn clone(&self) -> Self {
        LazyCache {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> LazyCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache refreshed by a single-key fetcher.
    ///
    /// # Arguments
    /// * `fetcher` - Loads one key from the backing source
    /// * `ttl` - Time after a write before the entry goes stale
    /// * `capacity` - Initial map capacity (an allocation hint, not a bound)
    pub fn new(fetcher: impl Fetcher<V> + 'static, ttl: Duration, capacity: usize) -> Self {
        Self::with_strategy(FetchStrategy::single(fetcher), ttl, capacity)
    }

    /// Create a cache refreshed by a group fetcher, without a fallback.
    pub fn new_group(group: impl GroupFetcher<V> + 'static, ttl: Duration, capacity: usize) -> Self {
        Self::with_strategy(FetchStrategy::group(group), ttl, capacity)
    }

    /// Create a cache with an explicit strategy.
    pub fn with_strategy(strategy: FetchStrategy<V>, ttl: Duration, capacity: usize) -> Self {
        Self::assemble(strategy, ttl, capacity, false, None)
    }

    /// Start building a cache.
    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    pub(crate) fn assemble(
        strategy: FetchStrategy<V>,
        ttl: Duration,
        capacity: usize,
        coalesce_refreshes: bool,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Self {
        LazyCache {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    items: HashMap::with_capacity(capacity),
                    strategy,
                }),
                ttl,
                coalesce_refreshes,
                refreshing: Mutex::new(HashSet::new()),
                metrics,
            }),
        }
    }

    /// The TTL applied to every write.
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Number of entries, including absent ones.
    pub async fn len(&self) -> usize {
        self.inner.state.read().await.items.len()
    }

    /// Whether no entry has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.state.read().await.items.is_empty()
    }

    /// Name of the strategy in effect.
    pub async fn strategy_name(&self) -> &'static str {
        self.inner.state.read().await.strategy.name()
    }

    /// Return the best known value for `key`.
    ///
    /// - Fresh entry: returned, no fetch.
    /// - Expired entry: returned, and a background refresh is spawned. Its
    ///   outcome is never reported to this caller.
    /// - No entry: fetched in the foreground. Fetch errors are logged and
    ///   reported as `None`.
    pub async fn get(&self, key: &str) -> Option<V> {
        let lookup = {
            let state = self.inner.state.read().await;
            state
                .items
                .get(key)
                .map(|entry| (entry.value.clone(), entry.is_expired(Instant::now())))
        };

        match lookup {
            Some((value, false)) => {
                self.emit(|| CacheMetric::Read {
                    key: key.to_string(),
                    status: ReadStatus::Hit,
                });
                value
            }
            Some((value, true)) => {
                self.emit(|| CacheMetric::Read {
                    key: key.to_string(),
                    status: ReadStatus::Stale,
                });
                tracing::debug!("Serving stale entry, refreshing in background: key={}", key);
                self.spawn_refresh(key);
                value
            }
            None => {
                self.emit(|| CacheMetric::Read {
                    key: key.to_string(),
                    status: ReadStatus::Miss,
                });
                match self.fetch(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!("Fetch on miss failed: key={}, error={}", key, e);
                        None
                    }
                }
            }
        }
    }

    /// Return the cached value without fetching, whether fresh or stale.
    pub async fn peek(&self, key: &str) -> Option<V> {
        let state = self.inner.state.read().await;
        state.items.get(key).and_then(|entry| entry.value.clone())
    }

    /// Store `value` for `key`, resetting its staleness clock.
    ///
    /// Passing `None` stores an absent entry.
    pub async fn set(&self, key: &str, value: impl Into<Option<V>>) {
        self.set_with_ttl(key, value, self.inner.ttl).await
    }

    /// Store `value` for `key` with a TTL other than the cache default.
    pub async fn set_with_ttl(&self, key: &str, value: impl Into<Option<V>>, ttl: Duration) {
        let value = value.into();
        self.inner.state.write().await.store(key, value, ttl);
    }

    /// Refresh `key` with the current strategy and return the fetched value.
    ///
    /// This is the refresh `get` runs on a miss or in the background. Unlike
    /// `get` it reports fetch errors; the cached entry is left untouched when
    /// it fails.
    pub async fn fetch(&self, key: &str) -> Result<Option<V>, CacheError> {
        // Snapshot the strategy so the fetch itself runs without the lock
        let strategy = self.inner.state.read().await.strategy.clone();

        match strategy {
            FetchStrategy::Single(fetcher) => {
                self.fetch_single(&fetcher, key, FetchSource::Single).await
            }
            FetchStrategy::Group { group, fallback } => {
                self.fetch_group(&group, fallback.as_ref(), key).await
            }
        }
    }

    async fn fetch_single(
        &self,
        fetcher: &Arc<dyn Fetcher<V>>,
        key: &str,
        source: FetchSource,
    ) -> Result<Option<V>, CacheError> {
        let start = std::time::Instant::now();
        let result = fetcher.fetch(key).await;
        let latency_ms = elapsed_ms(start);

        match result {
            Ok(value) => {
                self.inner
                    .state
                    .write()
                    .await
                    .store(key, value.clone(), self.inner.ttl);
                self.emit_fetch(key, source, FetchOutcome::Stored, latency_ms);
                Ok(value)
            }
            Err(source_err) => {
                self.emit_fetch(key, source, FetchOutcome::Failed, latency_ms);
                Err(CacheError::fetch(key, source_err))
            }
        }
    }

    async fn fetch_group(
        &self,
        group: &Arc<dyn GroupFetcher<V>>,
        fallback: Option<&Arc<dyn Fetcher<V>>>,
        key: &str,
    ) -> Result<Option<V>, CacheError> {
        let start = std::time::Instant::now();
        let result = group.fetch_group().await;
        let latency_ms = elapsed_ms(start);

        let failure = match result {
            Ok(values) if !values.is_empty() => {
                // A result without the requested key is still a success
                let requested = values.get(key).cloned();
                let count = values.len();
                {
                    let mut state = self.inner.state.write().await;
                    for (k, v) in values {
                        state.store(&k, Some(v), self.inner.ttl);
                    }
                    // Cache the miss so reads within the TTL skip the group fetch
                    if requested.is_none() && !state.items.contains_key(key) {
                        state.store(key, None, self.inner.ttl);
                    }
                }
                tracing::debug!("Stored group fetch result: key={}, entries={}", key, count);
                self.emit_fetch(key, FetchSource::Group, FetchOutcome::Stored, latency_ms);
                return Ok(requested);
            }
            Ok(_) => {
                self.emit_fetch(key, FetchSource::Group, FetchOutcome::Empty, latency_ms);
                None
            }
            Err(e) => {
                self.emit_fetch(key, FetchSource::Group, FetchOutcome::Failed, latency_ms);
                Some(e)
            }
        };

        match (fallback, failure) {
            (Some(fetcher), Some(e)) => {
                tracing::warn!(
                    "Group fetch failed, falling back to single fetcher: key={}, error={}",
                    key,
                    e
                );
                self.fetch_single(fetcher, key, FetchSource::Fallback).await
            }
            (Some(fetcher), None) => {
                tracing::debug!("Group fetch empty, falling back to single fetcher: key={}", key);
                self.fetch_single(fetcher, key, FetchSource::Fallback).await
            }
            (None, Some(e)) => Err(CacheError::GroupFetch { source: e }),
            // Empty group result without a fallback leaves existing entries alone
            (None, None) => Ok(None),
        }
    }

    /// Refresh `key` on a detached task.
    fn spawn_refresh(&self, key: &str) {
        let cache = self.clone();
        let key = key.to_string();

        tokio::spawn(async move {
            let _marker = if cache.inner.coalesce_refreshes {
                if !cache.inner.begin_refresh(&key) {
                    tracing::debug!("Refresh already in flight: key={}", key);
                    return;
                }
                Some(RefreshMarker {
                    inner: Arc::clone(&cache.inner),
                    key: key.clone(),
                })
            } else {
                None
            };

            if let Err(e) = cache.fetch(&key).await {
                tracing::warn!(
                    "Background refresh failed, keeping stale value: key={}, error={}",
                    key,
                    e
                );
            }
        });
    }

    /// Replace the fetch strategy. Cached entries are kept.
    ///
    /// Background refreshes already running finish with the strategy they
    /// started with.
    pub async fn swap_strategy(&self, strategy: FetchStrategy<V>) {
        self.update_strategy(|_| strategy).await
    }

    /// Replace the single-key fetcher.
    ///
    /// On a group strategy the fetcher becomes the fallback.
    pub async fn swap_single(&self, fetcher: impl Fetcher<V> + 'static) {
        let fetcher: Arc<dyn Fetcher<V>> = Arc::new(fetcher);
        self.update_strategy(|current| current.with_single(fetcher))
            .await
    }

    /// Install or replace the group fetcher.
    ///
    /// A configured single-key fetcher stays on as the fallback.
    pub async fn swap_group(&self, group: impl GroupFetcher<V> + 'static) {
        let group: Arc<dyn GroupFetcher<V>> = Arc::new(group);
        self.update_strategy(|current| current.with_group(group))
            .await
    }

    async fn update_strategy(&self, f: impl FnOnce(FetchStrategy<V>) -> FetchStrategy<V>) {
        let (name, group, single) = {
            let mut state = self.inner.state.write().await;
            let current = state.strategy.clone();
            state.strategy = f(current);
            (
                state.strategy.name(),
                state.strategy.is_group(),
                state.strategy.has_single(),
            )
        };

        tracing::debug!(
            "Swapped fetch strategy: strategy={}, group={}, single={}",
            name,
            group,
            single
        );
        self.emit(|| CacheMetric::Swap { strategy: name });
    }

    fn emit(&self, metric: impl FnOnce() -> CacheMetric) {
        if let Some(sink) = &self.inner.metrics {
            sink.emit(metric());
        }
    }

    fn emit_fetch(&self, key: &str, source: FetchSource, outcome: FetchOutcome, latency_ms: f64) {
        self.emit(|| CacheMetric::Fetch {
            key: key.to_string(),
            source,
            outcome,
            latency_ms,
        });
    }
}
