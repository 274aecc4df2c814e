//! Criterion benchmarks for tensor field evaluation.
//!
//! Benchmarks:
//!   - basis sum with 4 and 32 user elements
//!   - blended city field with a baked height map
//!   - streamline integration of one sample step
//!
//! Run with: cargo bench -p generation --bench field_bench

use bevy::math::Vec2;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use generation::field::{BasisField, BasisSumField, CityField, FieldSettings, SingularityKind};
use generation::raster::HeightMap;
use generation::tracer::integrate;
use generation::{Point, TensorField};

const SEED: u64 = 0xC17E;

fn random_basis(rng: &mut ChaCha8Rng) -> BasisField {
    let anchor = Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
    if rng.gen_bool(0.25) {
        let kind = SingularityKind::ALL[rng.gen_range(0..SingularityKind::ALL.len())];
        BasisField::singular(anchor, 1.0, kind)
    } else {
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::PI);
        BasisField::regular(anchor, 1.0, Vec2::from_angle(angle))
    }
}

// ---------------------------------------------------------------------------
// Benchmark: basis sum
// ---------------------------------------------------------------------------

fn bench_basis_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis_sum");
    for n in [4usize, 32] {
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        let mut sum = BasisSumField::default();
        for _ in 0..n {
            sum.insert(random_basis(&mut rng));
        }
        group.bench_with_input(BenchmarkId::from_parameter(n), &sum, |b, sum| {
            b.iter(|| black_box(sum.evaluate(black_box(Point::new(0.37, 0.61)))));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: blended field
// ---------------------------------------------------------------------------

fn bench_city_field(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut field = CityField::new(FieldSettings::default());
    for _ in 0..8 {
        field.insert_basis(random_basis(&mut rng));
    }
    field.set_height_map(Some(HeightMap::from_noise(128, 128, 1337, 0.02)));

    c.bench_function("city_field_evaluate", |b| {
        b.iter(|| black_box(field.evaluate(black_box(Point::new(0.52, 0.48)))));
    });
}

// ---------------------------------------------------------------------------
// Benchmark: integration
// ---------------------------------------------------------------------------

fn bench_integrate(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(SEED);
    let mut field = CityField::new(FieldSettings::default());
    for _ in 0..8 {
        field.insert_basis(random_basis(&mut rng));
    }

    c.bench_function("integrate_one_sample", |b| {
        b.iter(|| {
            let mut p = black_box(Point::new(0.5, 0.5));
            let mut d = Vec2::X;
            black_box(integrate(&field, true, &mut p, &mut d, 0.005))
        });
    });
}

criterion_group!(benches, bench_basis_sum, bench_city_field, bench_integrate);
criterion_main!(benches);
