use std::sync::Arc;

use crate::fetcher::{Fetcher, GroupFetcher};

/// The fetch strategy a cache uses to refresh entries.
///
/// A group fetcher, when present, is always tried first. The single-key
/// fetcher is then only consulted as a fallback when the group fetch fails or
/// comes back empty.
pub enum FetchStrategy<V> {
    /// Refresh one key at a time.
    Single(Arc<dyn Fetcher<V>>),
    /// Refresh every key the group fetcher returns in one call.
    Group {
        group: Arc<dyn GroupFetcher<V>>,
        fallback: Option<Arc<dyn Fetcher<V>>>,
    },
}

impl<V> Clone for FetchStrategy<V> {
    fn clone(&self) -> Self {
        match self {
            FetchStrategy::Single(fetcher) => FetchStrategy::Single(Arc::clone(fetcher)),
            FetchStrategy::Group { group, fallback } => FetchStrategy::Group {
                group: Arc::clone(group),
                fallback: fallback.clone(),
            },
        }
    }
}

impl<V> FetchStrategy<V> {
    /// A single-key strategy.
    pub fn single(fetcher: impl Fetcher<V> + 'static) -> Self {
        FetchStrategy::Single(Arc::new(fetcher))
    }

    /// A group strategy without a fallback.
    pub fn group(group: impl GroupFetcher<V> + 'static) -> Self {
        FetchStrategy::Group {
            group: Arc::new(group),
            fallback: None,
        }
    }

    /// A group strategy that falls back to `fetcher` for the requested key.
    pub fn group_with_fallback(
        group: impl GroupFetcher<V> + 'static,
        fetcher: impl Fetcher<V> + 'static,
    ) -> Self {
        FetchStrategy::Group {
            group: Arc::new(group),
            fallback: Some(Arc::new(fetcher)),
        }
    }

    /// Build a strategy from optional parts.
    ///
    /// Returns `None` when neither fetcher is given.
    pub fn from_parts(
        single: Option<Arc<dyn Fetcher<V>>>,
        group: Option<Arc<dyn GroupFetcher<V>>>,
    ) -> Option<Self> {
        match (single, group) {
            (fallback, Some(group)) => Some(FetchStrategy::Group { group, fallback }),
            (Some(single), None) => Some(FetchStrategy::Single(single)),
            (None, None) => None,
        }
    }

    /// Replace the single-key fetcher, keeping any group fetcher.
    ///
    /// For a group strategy the new fetcher becomes the fallback.
    pub fn with_single(self, fetcher: Arc<dyn Fetcher<V>>) -> Self {
        match self {
            FetchStrategy::Single(_) => FetchStrategy::Single(fetcher),
            FetchStrategy::Group { group, .. } => FetchStrategy::Group {
                group,
                fallback: Some(fetcher),
            },
        }
    }

    /// Install or replace the group fetcher.
    ///
    /// A previously configured single-key fetcher is kept as the fallback.
    pub fn with_group(self, group: Arc<dyn GroupFetcher<V>>) -> Self {
        let fallback = match self {
            FetchStrategy::Single(fetcher) => Some(fetcher),
            FetchStrategy::Group { fallback, .. } => fallback,
        };
        FetchStrategy::Group { group, fallback }
    }

    /// Whether a group fetcher is configured.
    pub fn is_group(&self) -> bool {
        matches!(self, FetchStrategy::Group { .. })
    }

    /// Whether a single-key fetcher is configured, either alone or as fallback.
    pub fn has_single(&self) -> bool {
        match self {
            FetchStrategy::Single(_) => true,
            FetchStrategy::Group { fallback, .. } => fallback.is_some(),
        }
    }

    /// A name for metrics/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            FetchStrategy::Single(_) => "single",
            FetchStrategy::Group { fallback: None, .. } => "group",
            FetchStrategy::Group {
                fallback: Some(_), ..
            } => "group+fallback",
        }
    }
}
