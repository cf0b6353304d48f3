//! Benchmarks for the cache lookup paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use block_cache_sim::cache::Cache;
use block_cache_sim::config::CacheConfig;
use block_cache_sim::memory::VecMemory;

fn bench_hit_path(c: &mut Criterion) {
    let mem = VecMemory::with_pattern(64 * 1024);
    let mut cache = Cache::new(&mem, CacheConfig::direct_mapped(256, 64)).unwrap();

    // Warm: the first 16KB fit exactly.
    for address in (0..16 * 1024).step_by(64) {
        cache.load(address).unwrap();
    }

    c.bench_function("direct_mapped_hit_16kb", |b| {
        b.iter(|| {
            for address in (0..16 * 1024u64).step_by(61) {
                black_box(cache.load(black_box(address)).unwrap());
            }
        })
    });
}

fn bench_conflict_misses(c: &mut Criterion) {
    let mem = VecMemory::with_pattern(64 * 1024);
    let mut cache = Cache::new(&mem, CacheConfig::direct_mapped(256, 64)).unwrap();

    // Every address maps to slot 0 with a new tag.
    c.bench_function("direct_mapped_conflict_miss", |b| {
        b.iter(|| {
            for address in (0..64 * 1024u64).step_by(16 * 1024) {
                black_box(cache.load(black_box(address)).unwrap());
            }
        })
    });
}

fn bench_fully_associative_scan(c: &mut Criterion) {
    let mem = VecMemory::with_pattern(64 * 1024);
    let mut cache = Cache::new(&mem, CacheConfig::fully_associative(256, 64)).unwrap();
    for address in (0..16 * 1024).step_by(64) {
        cache.load(address).unwrap();
    }

    // Worst case: the hit is in the last slot.
    c.bench_function("fully_associative_scan_256", |b| {
        b.iter(|| black_box(cache.load(black_box(16 * 1024 - 1)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_hit_path,
    bench_conflict_misses,
    bench_fully_associative_scan,
);
criterion_main!(benches);
