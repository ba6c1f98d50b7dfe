//! # Pool Allocator Benchmark
//!
//! Measures claim/release cost of the object pools under the stock layout.
//!
//! Run with: `cargo bench --package tessera_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{BuildProfile, FixedPoolAllocator, HostInterrupts, PoolConfig};

fn stock_pools() -> FixedPoolAllocator {
    FixedPoolAllocator::new(&PoolConfig::default(), BuildProfile::Shipping, HostInterrupts::new())
        .expect("stock layout is valid")
}

/// Benchmark: allocate then immediately free one block.
fn bench_allocate_free(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_free");

    for size in [12usize, 40, 150] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let pools = stock_pools();
            b.iter(|| {
                let handle = pools.allocate(black_box(size)).unwrap();
                pools.free(handle).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark: fill the 20-byte class to 90% and allocate into the tail.
fn bench_nearly_full_pool(c: &mut Criterion) {
    c.bench_function("allocate_nearly_full", |b| {
        let pools = stock_pools();
        let held: Vec<_> = (0..630).map(|_| pools.allocate(20).unwrap()).collect();
        b.iter(|| {
            let handle = pools.allocate(black_box(20)).unwrap();
            pools.free(handle).unwrap();
        });
        drop(held);
    });
}

criterion_group!(benches, bench_allocate_free, bench_nearly_full_pool);
criterion_main!(benches);
