/// Error type returned by user supplied fetchers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The single-key fetcher failed for a key.
    #[error("fetch failed for key '{key}': {source}")]
    Fetch {
        key: String,
        #[source]
        source: BoxError,
    },
    /// The group fetcher failed and no single-key fallback was configured.
    #[error("group fetch failed: {source}")]
    GroupFetch {
        #[source]
        source: BoxError,
    },
    /// A cache was built without any fetcher.
    #[error("no fetcher configured: supply a fetcher or a group fetcher")]
    NoFetcher,
    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Create a new single-key fetch error.
    pub fn fetch(key: impl Into<String>, source: BoxError) -> Self {
        CacheError::Fetch {
            key: key.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = CacheError::fetch("user:1", "connection refused".into());
        assert_eq!(
            err.to_string(),
            "fetch failed for key 'user:1': connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
