//! Example demonstrating a long-lived cache that changes its data source.
//!
//! A group fetcher warms the whole table in one round trip, a single-key
//! fetcher covers keys the batch endpoint misses, and halfway through the
//! backend is swapped without dropping any cached entry.

use lazy_cache::{BoxError, CacheBuilder, fetcher_fn, group_fetcher_fn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ApiKey {
    key: String,
    user_id: String,
    created_at: i64,
}

fn api_key(key: &str, user_id: &str) -> ApiKey {
    ApiKey {
        key: key.to_string(),
        user_id: user_id.to_string(),
        created_at: 1234567890,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cache = CacheBuilder::new()
        .ttl(Duration::from_millis(200))
        .capacity(64)
        .group_fetcher(group_fetcher_fn(|| async {
            println!("Loading every api key from the primary database");
            let mut keys = HashMap::new();
            keys.insert("key_123".to_string(), api_key("sk_test_123", "chronark"));
            keys.insert("key_456".to_string(), api_key("sk_test_456", "andreas"));
            Ok::<_, BoxError>(keys)
        }))
        .fetcher(fetcher_fn(|id: String| async move {
            println!("Loading {} from the primary database", id);
            Ok::<Option<ApiKey>, BoxError>(None)
        }))
        .build()?;

    // One group fetch warms both keys
    println!("key_123: {:?}", cache.get("key_123").await);
    println!("key_456 (cached): {:?}", cache.get("key_456").await);

    // Switch to the replica; warmed entries survive the swap
    cache
        .swap_group(group_fetcher_fn(|| async {
            println!("Loading every api key from the replica");
            let mut keys = HashMap::new();
            keys.insert("key_123".to_string(), api_key("sk_live_123", "chronark"));
            Ok::<_, BoxError>(keys)
        }))
        .await;
    println!("key_123 after swap (cached): {:?}", cache.get("key_123").await);

    tokio::time::sleep(Duration::from_millis(250)).await;

    // Expired: the stale value comes back at once, the replica refreshes it
    println!("key_123 (stale): {:?}", cache.get("key_123").await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("key_123 (refreshed): {:?}", cache.get("key_123").await);

    Ok(())
}
