use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lazy_cache::{CacheBuilder, LazyCache};
use std::time::Duration;
use tokio::runtime::Runtime;

mod common;
use common::{BenchConfig, BenchUser, FakeDatabase, KeyGenerator, warm_cache};

/// Single-key cache over the fake database
fn setup_single(db: &FakeDatabase, ttl: Duration, coalesce: bool) -> LazyCache<BenchUser> {
    CacheBuilder::new()
        .ttl(ttl)
        .capacity(10_000)
        .coalesce_refreshes(coalesce)
        .fetcher(db.clone())
        .build()
        .expect("fetcher configured")
}

/// Group cache with single-key fallback over the fake database
fn setup_group(db: &FakeDatabase, ttl: Duration) -> LazyCache<BenchUser> {
    CacheBuilder::new()
        .ttl(ttl)
        .capacity(10_000)
        .group_fetcher(db.clone())
        .fetcher(db.clone())
        .build()
        .expect("fetcher configured")
}

/// Benchmark 1: Hot Cache (all hits, pure cache read performance)
fn bench_hot_cache(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("hot_cache");
    group.sample_size(config.sample_size);

    let db = FakeDatabase::new(10_000, config.db_latency_ms);
    let keys = KeyGenerator::new(10_000).sequential();
    let ttl = config.cache.ttl();

    group.throughput(Throughput::Elements(keys.len() as u64));

    let single = setup_single(&db, ttl, config.cache.coalesce_refreshes);
    rt.block_on(warm_cache(&single, &keys));
    group.bench_function("single", |b| {
        b.to_async(&rt).iter(|| async {
            for key in &keys {
                black_box(single.get(key).await);
            }
        });
    });

    // One group fetch warms every key
    let grouped = setup_group(&db, ttl);
    rt.block_on(warm_cache(&grouped, &keys[..1]));
    group.bench_function("group", |b| {
        b.to_async(&rt).iter(|| async {
            for key in &keys {
                black_box(grouped.get(key).await);
            }
        });
    });

    group.finish();
}

/// Benchmark 2: Stale reads (every read expired, refreshes run in the background)
fn bench_stale_reads(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("stale_reads");
    group.sample_size(config.sample_size.min(50));

    let db = FakeDatabase::new(1_000, config.db_latency_ms);
    let keys = KeyGenerator::new(1_000).zipf_random(200);

    for coalesce in [false, true] {
        let cache = setup_single(&db, Duration::ZERO, coalesce);
        rt.block_on(warm_cache(&cache, &keys));

        group.bench_with_input(
            BenchmarkId::new("coalesce", coalesce),
            &coalesce,
            |b, &_c| {
                b.to_async(&rt).iter(|| async {
                    for key in &keys {
                        black_box(cache.get(key).await);
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark 3: Cold Cache (all misses, foreground fetch performance)
fn bench_cold_cache(c: &mut Criterion, config: &BenchConfig) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cold_cache");
    group.sample_size(config.sample_size.min(20)); // Fewer samples due to origin latency
    group.measurement_time(Duration::from_secs(30));

    let db = FakeDatabase::new(1_000, config.db_latency_ms);
    let keys = KeyGenerator::new(1_000).sequential();
    let ttl = config.cache.ttl();

    group.bench_function("single", |b| {
        b.to_async(&rt).iter(|| {
            // Fresh cache per iteration so every read misses
            let cache = setup_single(&db, ttl, config.cache.coalesce_refreshes);
            let keys = keys.clone();
            async move {
                for key in keys.iter().take(10) {
                    black_box(cache.get(key).await);
                }
            }
        });
    });

    group.finish();
}

fn run_benchmarks(c: &mut Criterion) {
    let config = BenchConfig::new();

    eprintln!("\n=== Running Benchmarks ===\n");

    bench_hot_cache(c, &config);
    bench_stale_reads(c, &config);
    bench_cold_cache(c, &config);
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
