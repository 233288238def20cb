use lazy_cache::CacheConfig;
use std::env;

/// Benchmark knobs. Cache settings come from the same `LAZY_CACHE_*`
/// variables a deployed cache reads.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub cache: CacheConfig,

    /// Simulated fetch latency (DB_LATENCY_MS, default 5).
    pub db_latency_ms: u64,

    /// Criterion sample size (BENCH_SAMPLE_SIZE, default 100).
    pub sample_size: usize,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl BenchConfig {
    pub fn new() -> Self {
        let config = BenchConfig {
            cache: CacheConfig::from_env(),
            db_latency_ms: env_or("DB_LATENCY_MS", 5),
            sample_size: env_or("BENCH_SAMPLE_SIZE", 100),
        };
        eprintln!("Benchmark configuration: {:?}", config);
        config
    }
}
