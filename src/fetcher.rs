use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;

use crate::error::BoxError;

/// A fetcher loads the current value of a single key from the backing source.
///
/// Fetchers are called without any cache lock held, so a slow fetch never
/// stalls readers. The cache imposes no timeout: a fetcher that can hang is
/// responsible for bounding itself.
#[async_trait]
pub trait Fetcher<V>: Send + Sync {
    /// Load the value for `key`.
    ///
    /// `Ok(None)` means the key legitimately has no value; it is cached as an
    /// absent entry and overwrites whatever was cached before. `Err` leaves the
    /// cached entry untouched.
    async fn fetch(&self, key: &str) -> Result<Option<V>, BoxError>;
}

/// A group fetcher refreshes many keys in one round trip.
#[async_trait]
pub trait GroupFetcher<V>: Send + Sync {
    /// Load a full mapping of keys to values.
    ///
    /// An empty map is treated like a failure: the cache falls back to the
    /// single-key fetcher if one is configured, otherwise nothing is stored.
    async fn fetch_group(&self) -> Result<HashMap<String, V>, BoxError>;
}

/// Adapter returned by [`fetcher_fn`].
pub struct FnFetcher<F> {
    f: F,
}

/// Adapter returned by [`group_fetcher_fn`].
pub struct FnGroupFetcher<F> {
    f: F,
}

/// Build a [`Fetcher`] from an async closure taking the owned key.
///
/// # Example
/// ```ignore
/// let fetcher = fetcher_fn(|key: String| async move {
///     Ok::<_, BoxError>(db.find(&key).await?)
/// });
/// ```
pub fn fetcher_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

/// Build a [`GroupFetcher`] from an async closure.
pub fn group_fetcher_fn<F>(f: F) -> FnGroupFetcher<F> {
    FnGroupFetcher { f }
}

#[async_trait]
impl<V, F, Fut> Fetcher<V> for FnFetcher<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<V>, BoxError>> + Send + 'static,
    V: Send + 'static,
{
    async fn fetch(&self, key: &str) -> Result<Option<V>, BoxError> {
        (self.f)(key.to_string()).await
    }
}

#[async_trait]
impl<V, F, Fut> GroupFetcher<V> for FnGroupFetcher<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<HashMap<String, V>, BoxError>> + Send + 'static,
    V: Send + 'static,
{
    async fn fetch_group(&self) -> Result<HashMap<String, V>, BoxError> {
        (self.f)().await
    }
}
