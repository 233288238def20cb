//! lazy-cache - A stale-while-revalidate cache that never blocks a reader
//!
//! This library provides an in-memory key-value cache with:
//! - Stale-while-revalidate reads: expired values are served immediately and
//!   refreshed in the background
//! - Single-key and group (batch) fetch strategies, with per-key fallback
//! - Non-destructive error handling: a failed fetch never erases cached data
//! - Hot-swapping of the fetch strategy without losing warmed entries
//!
//! # Example
//!
//! ```ignore
//! use lazy_cache::{BoxError, LazyCache, fetcher_fn};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = LazyCache::new(
//!         fetcher_fn(|id: String| async move {
//!             // Load from database - 'id' is "user:123"
//!             Ok::<_, BoxError>(Some(format!("User data for {}", id)))
//!         }),
//!         Duration::from_secs(60),
//!         1024,
//!     );
//!
//!     let user = cache.get("user:123").await;
//! }
//! ```

mod builder;
mod cache;
mod config;
mod entry;
mod error;
mod fetcher;
pub mod metrics;
mod strategy;

// Re-export public API
pub use builder::CacheBuilder;
pub use cache::LazyCache;
pub use config::CacheConfig;
pub use error::{BoxError, CacheError};
pub use fetcher::{FnFetcher, FnGroupFetcher, Fetcher, GroupFetcher, fetcher_fn, group_fetcher_fn};
pub use metrics::{CacheMetric, FetchOutcome, FetchSource, MetricsSink, ReadStatus};
pub use strategy::FetchStrategy;
