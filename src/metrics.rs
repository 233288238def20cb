//! Metrics hook for cache reads, fetches and strategy swaps.
//!
//! Attach a `MetricsSink` through the builder to receive a `CacheMetric` for
//! every `get`, every fetch attempt and every strategy swap.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lazy_cache::{CacheBuilder, CacheMetric, MetricsSink};
//!
//! let sink = Arc::new(MyMetricsSink::new());
//! let cache = CacheBuilder::new()
//!     .fetcher(fetcher)
//!     .metrics(sink.clone())
//!     .build()?;
//! ```

use async_trait::async_trait;
use std::time::Instant;

/// How a read was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Entry present and within its TTL.
    Hit,
    /// Entry present but expired; served stale and refreshed in the background.
    Stale,
    /// No entry; fetched in the foreground.
    Miss,
}

/// Which fetcher served a fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The single-key fetcher as the only strategy.
    Single,
    /// The group fetcher.
    Group,
    /// The single-key fetcher after the group fetcher failed or was empty.
    Fallback,
}

/// What a fetch attempt did to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result was written to the cache.
    Stored,
    /// The group fetcher returned nothing; the cache was left untouched.
    Empty,
    /// The fetcher returned an error; the cache was left untouched.
    Failed,
}

/// Metrics emitted by the cache.
#[derive(Debug, Clone)]
pub enum CacheMetric {
    /// Emitted on every `get`.
    Read {
        /// The key that was read.
        key: String,
        /// How the read was served.
        status: ReadStatus,
    },
    /// Emitted for every fetcher invocation.
    Fetch {
        /// The key the fetch was triggered for.
        key: String,
        /// Which fetcher ran.
        source: FetchSource,
        /// What happened to the stored state.
        outcome: FetchOutcome,
        /// Latency of the fetcher call in milliseconds.
        latency_ms: f64,
    },
    /// Emitted when the fetch strategy is replaced.
    Swap {
        /// Name of the strategy now in effect.
        strategy: &'static str,
    },
}

/// Trait for receiving cache metrics.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
/// use async_trait::async_trait;
/// use lazy_cache::{CacheMetric, MetricsSink};
///
/// struct BufferedSink {
///     buffer: Mutex<Vec<CacheMetric>>,
/// }
///
/// #[async_trait]
/// impl MetricsSink for BufferedSink {
///     fn emit(&self, metric: CacheMetric) {
///         self.buffer.lock().unwrap().push(metric);
///     }
///
///     async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    ///
    /// This is called synchronously in the hot path of cache operations,
    /// including from background refresh tasks. Keep it fast.
    fn emit(&self, metric: CacheMetric);

    /// Flush any buffered metrics.
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sink that keeps every metric in memory.
    pub struct RecordingSink {
        metrics: Mutex<Vec<CacheMetric>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            RecordingSink {
                metrics: Mutex::new(Vec::new()),
            }
        }

        pub fn take_metrics(&self) -> Vec<CacheMetric> {
            std::mem::take(&mut *self.metrics.lock().unwrap())
        }
    }

    #[async_trait]
    impl MetricsSink for RecordingSink {
        fn emit(&self, metric: CacheMetric) {
            self.metrics.lock().unwrap().push(metric);
        }

        async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }
    }
}
