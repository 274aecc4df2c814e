//! Seeded demo layout: a handful of basis fields, seed markers, a noise
//! height map and a population gradient.

use bevy::math::Vec2;
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use generation::field::SingularityKind;
use generation::raster::{HeightMap, PopulationMap};
use generation::{BasisField, CityModel, Point};

const MAP_SIZE: usize = 128;
const NOISE_FREQUENCY: f32 = 4.0 / MAP_SIZE as f32;

#[derive(Resource, Debug, Clone, Copy)]
pub struct DemoSeed(pub u64);

fn random_point(rng: &mut ChaCha8Rng) -> Point {
    Point::new(rng.gen_range(0.15..0.85), rng.gen_range(0.15..0.85))
}

/// Startup system filling the model from [`DemoSeed`].
pub fn build_demo_city(seed: Res<DemoSeed>, mut model: ResMut<CityModel>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.0);

    let grids = rng.gen_range(2..=4);
    for _ in 0..grids {
        let angle: f32 = rng.gen_range(0.0..std::f32::consts::PI);
        model.insert_basis(BasisField::regular(
            random_point(&mut rng),
            rng.gen_range(0.5..1.5),
            Vec2::from_angle(angle),
        ));
    }
    if rng.gen_bool(0.5) {
        let kind = SingularityKind::ALL[rng.gen_range(0..SingularityKind::ALL.len())];
        model.insert_basis(BasisField::singular(random_point(&mut rng), 1.0, kind));
    }

    let markers = rng.gen_range(1..=3);
    for _ in 0..markers {
        let p = random_point(&mut rng);
        model.city_mut().add_seed_marker(p);
    }

    let noise_seed = rng.gen::<i32>();
    model.set_height_map(Some(HeightMap::from_noise(
        MAP_SIZE,
        MAP_SIZE,
        noise_seed,
        NOISE_FREQUENCY,
    )));

    // Denser towards the middle.
    model.set_population_map(Some(PopulationMap::from_fn(MAP_SIZE, MAP_SIZE, |col, row| {
        let c = (MAP_SIZE - 1) as f32 / 2.0;
        let d = Vec2::new(col as f32 - c, row as f32 - c).length() / c;
        (1.0 - d).clamp(0.0, 1.0)
    })));

    info!(
        "demo city from seed {}: {grids} grid fields, {markers} seed markers",
        seed.0
    );
}
