//! End-to-end generation benchmark through the Bevy plugin.
//!
//! Uses `TestGenerator`, so it needs the `bench` feature:
//!
//! Run with: cargo bench -p generation --bench city_bench --features bench

use criterion::{criterion_group, criterion_main, Criterion};

use generation::test_harness::TestGenerator;

fn bench_grid_city(c: &mut Criterion) {
    let mut group = c.benchmark_group("city");
    group.sample_size(10);
    group.bench_function("grid_city_run_to_completion", |b| {
        b.iter_batched(
            TestGenerator::grid_city,
            |mut gen| {
                let summary = gen.run_to_completion();
                assert!(summary.finished);
                gen
            },
            criterion::BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_grid_city);
criterion_main!(benches);
