use bevy::math::Vec2;

use crate::events::FieldChange;
use crate::field::{BasisField, SingularityKind};
use crate::geometry::Point;
use crate::raster::{HeightMap, PopulationMap};
use crate::test_harness::TestGenerator;
use crate::tracer::RoadTier;

#[test]
fn test_config_edit_reloads_local_tier() {
    let mut gen = TestGenerator::grid_city();
    gen.run_to_completion();
    gen.take_log();

    gen.config_mut().local.dist_sep = 0.05;
    gen.update();

    let city = gen.model().city();
    assert_eq!(city.params(RoadTier::Local).dist_sep, 0.05);
    assert_eq!(city.params(RoadTier::Major).dist_sep, 0.25);
    for district in city.districts() {
        assert_eq!(district.region().tracer().params().dist_sep, 0.05);
    }
    // Tracer parameters are not a field change.
    assert!(gen.log().field_changed.is_empty());
}

#[test]
fn test_config_field_edit_is_a_weight_change() {
    let mut gen = TestGenerator::new();
    gen.config_mut().field.height_weight = 0.8;
    gen.update();

    assert_eq!(gen.model().field().settings().height_weight, 0.8);
    let log = gen.take_log();
    assert_eq!(log.field_changed.len(), 1);
    assert_eq!(log.field_changed[0].change, FieldChange::Weights);
}

#[test]
fn test_raster_inputs_are_reported() {
    let mut gen = TestGenerator::new();
    gen.model_mut()
        .set_height_map(Some(HeightMap::from_noise(32, 32, 7, 0.05)));
    gen.model_mut()
        .set_population_map(Some(PopulationMap::new(8, 8, 0.5)));
    gen.update();

    assert!(gen.model().field().height_map().is_some());
    let changes: Vec<FieldChange> = gen.log().field_changed.iter().map(|e| e.change).collect();
    assert_eq!(changes, vec![FieldChange::Height, FieldChange::Population]);
}

#[test]
fn test_districts_inherit_singularities() {
    let centre = Point::new(0.3, 0.7);
    let mut gen = TestGenerator::grid_city()
        .with_basis(BasisField::singular(centre, 1.0, SingularityKind::Center))
        .with_basis(BasisField::regular(Point::new(0.8, 0.2), 1.0, Vec2::Y));
    gen.run_to_completion();

    let city = gen.model().city();
    assert_eq!(city.region().seeder().singularities(), &[centre]);
    assert!(city.district_count() > 0);
    for district in city.districts() {
        assert_eq!(district.region().seeder().singularities(), &[centre]);
    }
}
