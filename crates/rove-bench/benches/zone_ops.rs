//! Criterion micro-benchmarks for zone allocation, freeing and purging.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rove_bench::churn_sizes;
use rove_core::PurgeTag;
use rove_zone::{MemoryResource, ZoneConfig};

fn zone() -> MemoryResource {
    MemoryResource::init(&ZoneConfig::with_megabytes(8)).unwrap()
}

/// Allocate 1K blocks, free every other one, then the rest.
fn bench_alloc_free_churn(c: &mut Criterion) {
    let sizes = churn_sizes(1024, 42);
    let mut mem = zone();

    c.bench_function("zone_churn_1k", |b| {
        b.iter(|| {
            let ptrs: Vec<_> = sizes
                .iter()
                .map(|&n| mem.allocate(n, PurgeTag::Level, None))
                .collect();
            for p in ptrs.iter().step_by(2) {
                mem.free(*p);
            }
            for p in ptrs.iter().skip(1).step_by(2) {
                mem.free(*p);
            }
            black_box(mem.total_free_bytes());
        });
    });
}

/// Fill with level and special blocks, then release them in one sweep.
fn bench_free_tags(c: &mut Criterion) {
    let sizes = churn_sizes(1024, 7);
    let mut mem = zone();

    c.bench_function("zone_free_tags_1k", |b| {
        b.iter(|| {
            for (i, &n) in sizes.iter().enumerate() {
                let tag = if i % 3 == 0 {
                    PurgeTag::LevSpec
                } else {
                    PurgeTag::Level
                };
                mem.allocate(n, tag, None);
            }
            black_box(mem.free_tags(PurgeTag::Level, PurgeTag::LevSpec));
        });
    });
}

/// Keep 64 cache owners filled in a zone that holds about half of them, so
/// every refill purges an older block.
fn bench_cache_purge(c: &mut Criterion) {
    let mut mem = MemoryResource::init(&ZoneConfig::new(256 * 1024)).unwrap();
    let slots: Vec<_> = (0..64).map(|_| mem.new_owner()).collect();

    c.bench_function("zone_cache_purge", |b| {
        b.iter(|| {
            for &slot in &slots {
                if mem.owner_target(slot).is_none() {
                    black_box(mem.allocate(8 * 1024, PurgeTag::Cache, Some(slot)));
                }
            }
        });
    });
}

criterion_group!(
    benches,
    bench_alloc_free_churn,
    bench_free_tags,
    bench_cache_purge
);
criterion_main!(benches);
