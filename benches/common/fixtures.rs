use async_trait::async_trait;
use lazy_cache::{BoxError, Fetcher, GroupFetcher, LazyCache};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test data structure for benchmarks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub score: u32,
}

impl BenchUser {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            score: (id % 1000) as u32,
        }
    }
}

/// Simulated database with configurable latency.
///
/// Serves both as a single-key fetcher and as a group fetcher returning the
/// whole table.
#[derive(Clone)]
pub struct FakeDatabase {
    data: Arc<HashMap<String, BenchUser>>,
    latency_ms: u64,
    query_count: Arc<AtomicUsize>,
}

impl FakeDatabase {
    pub fn new(num_users: usize, latency_ms: u64) -> Self {
        let data = (0..num_users)
            .map(|i| (format!("user:{}", i), BenchUser::new(i as u64)))
            .collect();

        Self {
            data: Arc::new(data),
            latency_ms,
            query_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn simulate_latency(&self) {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
    }

    #[allow(dead_code)]
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Fetcher<BenchUser> for FakeDatabase {
    async fn fetch(&self, key: &str) -> Result<Option<BenchUser>, BoxError> {
        self.simulate_latency().await;
        Ok(self.data.get(key).cloned())
    }
}

#[async_trait]
impl GroupFetcher<BenchUser> for FakeDatabase {
    async fn fetch_group(&self) -> Result<HashMap<String, BenchUser>, BoxError> {
        self.simulate_latency().await;
        Ok(self.data.as_ref().clone())
    }
}

/// Read every key once so later reads are hits.
pub async fn warm_cache(cache: &LazyCache<BenchUser>, keys: &[String]) {
    for key in keys {
        let _ = cache.get(key).await;
    }
}

/// Generate test keys for different workload patterns
pub struct KeyGenerator {
    num_keys: usize,
}

impl KeyGenerator {
    pub fn new(num_keys: usize) -> Self {
        Self { num_keys }
    }

    /// Generate sequential keys (for cold cache tests)
    pub fn sequential(&self) -> Vec<String> {
        (0..self.num_keys).map(|i| format!("user:{}", i)).collect()
    }

    /// Generate keys with Zipf distribution (realistic - few hot keys)
    pub fn zipf_random(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();

        (0..count)
            .map(|_| {
                // Simplified Zipf: 80% of requests go to 20% of keys
                let key_id = if rng.gen_bool(0.8) {
                    rng.gen_range(0..(self.num_keys / 5))
                } else {
                    rng.gen_range((self.num_keys / 5)..self.num_keys)
                };
                format!("user:{}", key_id)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_database() {
        let db = FakeDatabase::new(100, 1);

        let user = db.fetch("user:0").await.unwrap();
        assert_eq!(user.unwrap().id, 0);

        let all = db.fetch_group().await.unwrap();
        assert_eq!(all.len(), 100);
        assert_eq!(db.query_count(), 2);
    }

    #[test]
    fn test_key_generator() {
        let key_gen = KeyGenerator::new(100);

        let seq = key_gen.sequential();
        assert_eq!(seq.len(), 100);
        assert_eq!(seq[0], "user:0");

        let zipf = key_gen.zipf_random(100);
        assert_eq!(zipf.len(), 100);
    }
}
