use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use memocache::MemoCache;

fn factorial(n: u64) -> u64 {
    (1..=n).fold(1u64, |acc, i| acc.wrapping_mul(i))
}

fn bench_cached_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_call");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("hit_factorial", |b| {
        let cache = MemoCache::new(1000, factorial);

        // Warm the cache
        for key in 0..100 {
            cache.call(key);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.call(counter % 100));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_hit_50_miss", |b| {
        let cache = MemoCache::new(1000, factorial);
        for key in 0..100 {
            cache.call(key);
        }

        let mut counter = 0u64;
        let mut fresh = 1_000_000u64;
        b.iter(|| {
            if counter.is_multiple_of(2) {
                black_box(cache.call(counter % 100));
            } else {
                black_box(cache.call(fresh));
                fresh += 1;
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("miss_with_eviction", |b| {
        let cache = MemoCache::new(10, factorial); // Small cache

        let mut counter = 0u64;
        b.iter(|| {
            // Cycling 100 keys through 10 slots guarantees misses
            black_box(cache.call(counter % 100));
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_call,
    bench_mixed_50_50,
    bench_cache_miss
);
criterion_main!(benches);
