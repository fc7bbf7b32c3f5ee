//! LRU-K replacer benchmarks.
//!
//! Measures the two operations on the pool's hot path: recording an
//! access and choosing an eviction victim.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rookdb::LruKReplacer;

const POOL_SIZES: &[usize] = &[64, 1024, 16384];

fn bench_record_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacer_record_access");

    for &size in POOL_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut replacer = LruKReplacer::new(size, 2);
            let mut frame = 0usize;
            b.iter(|| {
                replacer.record_access(black_box(frame)).unwrap();
                frame = (frame + 1) % size;
            });
        });
    }

    group.finish();
}

fn bench_evict_after_mixed_accesses(c: &mut Criterion) {
    let mut group = c.benchmark_group("replacer_evict");

    for &size in POOL_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut replacer = LruKReplacer::new(size, 2);
                    for frame in 0..size {
                        replacer.record_access(frame).unwrap();
                        // Every other frame graduates to the cache list.
                        if frame % 2 == 0 {
                            replacer.record_access(frame).unwrap();
                        }
                        replacer.set_evictable(frame, true).unwrap();
                    }
                    replacer
                },
                |mut replacer| {
                    while let Some(victim) = replacer.evict() {
                        black_box(victim);
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_record_access, bench_evict_after_mixed_accesses);
criterion_main!(benches);
