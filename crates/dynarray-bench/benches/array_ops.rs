//! Criterion micro-benchmarks for append, insert, clone and reserve,
//! with `Vec` alongside as a baseline.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dynarray::{DynamicArray, GrowthPolicy};
use dynarray_bench::{filled, insert_positions, Payload};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Benchmark: append `n` integers to an empty array.
fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    for n in SIZES {
        group.bench_with_input(BenchmarkId::new("dynarray", n), &n, |b, &n| {
            b.iter(|| black_box(filled(n)));
        });
        group.bench_with_input(BenchmarkId::new("vec", n), &n, |b, &n| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..n as u64 {
                    v.push(i);
                }
                black_box(v)
            });
        });
    }
    group.finish();
}

/// Benchmark: doubling versus exact growth for 10K appends.
fn bench_growth_policy(c: &mut Criterion) {
    let mut group = c.benchmark_group("growth_policy");
    for (name, policy) in [
        ("doubling", GrowthPolicy::doubling()),
        ("exact", GrowthPolicy::exact()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut arr = DynamicArray::with_growth(policy);
                for i in 0..10_000u64 {
                    arr.push(i).unwrap();
                }
                black_box(arr)
            });
        });
    }
    group.finish();
}

/// Benchmark: 2K inserts at pseudo-random positions.
fn bench_insert(c: &mut Criterion) {
    let positions = insert_positions(2_000, 42);
    let mut group = c.benchmark_group("insert_random");
    group.bench_function("dynarray", |b| {
        b.iter(|| {
            let mut arr = DynamicArray::new();
            for (i, &pos) in positions.iter().enumerate() {
                arr.insert(pos, i).unwrap();
            }
            black_box(arr)
        });
    });
    group.bench_function("vec", |b| {
        b.iter(|| {
            let mut v = Vec::new();
            for (i, &pos) in positions.iter().enumerate() {
                v.insert(pos, i);
            }
            black_box(v)
        });
    });
    group.finish();
}

/// Benchmark: deep copy and copy-assignment of 10K heap payloads.
fn bench_clone(c: &mut Criterion) {
    let source: DynamicArray<Payload> = (0..10_000).map(|i| Payload::new(i as u8, 16)).collect();
    let mut group = c.benchmark_group("clone_10k");
    group.bench_function("clone", |b| {
        b.iter(|| black_box(source.clone()));
    });
    group.bench_function("clone_from_reuse", |b| {
        let mut target = source.clone();
        b.iter(|| {
            target.clone_from(&source);
            black_box(target.len())
        });
    });
    group.finish();
}

/// Benchmark: reserve then fill, versus growing on demand.
fn bench_reserve(c: &mut Criterion) {
    let mut group = c.benchmark_group("reserve_100k");
    group.bench_function("reserved", |b| {
        b.iter(|| {
            let mut arr = DynamicArray::new();
            arr.reserve(100_000).unwrap();
            for i in 0..100_000u64 {
                arr.push(i).unwrap();
            }
            black_box(arr)
        });
    });
    group.bench_function("on_demand", |b| {
        b.iter(|| black_box(filled(100_000)));
    });
    group.finish();
}

/// Benchmark: sum over a 100K array through the slice view.
fn bench_iterate(c: &mut Criterion) {
    let arr = filled(100_000);
    c.bench_function("iterate_sum_100k", |b| {
        b.iter(|| black_box(arr.iter().sum::<u64>()));
    });
}

criterion_group!(
    benches,
    bench_push,
    bench_growth_policy,
    bench_insert,
    bench_clone,
    bench_reserve,
    bench_iterate
);
criterion_main!(benches);
