use super::*;
use crate::edge::EdgeKind;
use crate::events::RegionEvent;
use crate::field::ConstantField;
use crate::geometry::Polygon;
use crate::tensor::Tensor;

/// Step cap for full runs; generous compared with what the coarse
/// parameters below need.
const MAX_STEPS: usize = 50_000;

fn p(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

fn coarse_city() -> City {
    let major = TracerParams {
        dist_sep: 0.25,
        ..TracerParams::major()
    };
    let local = TracerParams {
        dist_sep: 0.1,
        ..TracerParams::local()
    };
    City::new(major, local)
}

fn grid_field() -> ConstantField {
    ConstantField(Tensor::new(1.0, 0.0))
}

fn run(city: &mut City, field: &dyn TensorField) -> usize {
    let mut steps = 0;
    while city.trace_step(field) {
        steps += 1;
        assert!(steps < MAX_STEPS, "city did not finish in {MAX_STEPS} steps");
    }
    steps
}

fn generated_city() -> City {
    let mut city = coarse_city();
    city.add_seed_marker(p(0.5, 0.5));
    run(&mut city, &grid_field());
    city
}

// ---------------------------------------------------------------------------
// Initialisation
// ---------------------------------------------------------------------------

#[test]
fn test_domain_bounds_form_one_cycle() {
    let mut city = City::default();
    city.trace_init();

    let tracer = city.region().tracer();
    assert_eq!(tracer.edge_count(), 4);
    assert!(tracer.edges().all(|e| e.kind() == EdgeKind::Boundary));
    for corner in [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)] {
        assert_eq!(tracer.find_edges_at(corner).len(), 2);
    }

    let cycles = city.region().find_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].base.len(), 4);
    assert!((cycles[0].base.area() - 1.0).abs() < 1e-4);

    // Nothing but boundary around it, so no district.
    assert_eq!(city.find_subregions(), 0);
    assert_eq!(city.district_count(), 0);
}

#[test]
fn test_seed_markers_are_queued_on_init() {
    let mut city = City::default();
    city.add_seed_marker(p(0.3, 0.3));
    city.add_seed_marker(p(0.3, 0.3));
    city.add_seed_marker(p(0.6, 0.6));
    assert_eq!(city.seed_markers().len(), 2);
    assert!(city.remove_seed_marker(p(0.6, 0.6)));
    assert!(!city.remove_seed_marker(p(0.6, 0.6)));

    city.trace_init();
    assert!(city.region().seeder().contains(p(0.3, 0.3)));
    let events = city.take_events();
    assert!(matches!(
        events[0],
        CityEvent::Region {
            owner: RegionKey::City,
            event: RegionEvent::SeedAdded(_)
        }
    ));
}

// ---------------------------------------------------------------------------
// Phase machine
// ---------------------------------------------------------------------------

#[test]
fn test_zero_field_walks_every_phase() {
    let mut city = City::default();
    let field = ConstantField(Tensor::ZERO);

    assert_eq!(city.phase(), CityPhase::MajorRoads);
    assert!(city.trace_step(&field));
    assert_eq!(city.phase(), CityPhase::Districts);
    assert!(city.trace_step(&field));
    assert_eq!(city.phase(), CityPhase::Blocks);
    assert!(!city.trace_step(&field));
    assert!(city.is_done());
    assert!(!city.trace_step(&field));

    assert_eq!(city.district_count(), 0);
    // Simplification joins the boundary sides but cannot collapse the
    // square below a triangle.
    assert_eq!(city.region().tracer().edge_count(), 3);
}

#[test]
fn test_full_run_produces_districts_and_blocks() {
    let mut city = coarse_city();
    city.add_seed_marker(p(0.5, 0.5));
    run(&mut city, &grid_field());

    assert!(city.is_done());
    assert!(city.district_count() >= 1);
    for district in city.districts() {
        assert!(district.polygon().area() > 0.0);
        for (_, block) in district.blocks() {
            assert!(block.area() > 0.0);
        }
    }

    let events = city.take_events();
    let districts_added = events
        .iter()
        .filter(|e| matches!(e, CityEvent::DistrictAdded(_)))
        .count();
    let blocks_added = events
        .iter()
        .filter(|e| matches!(e, CityEvent::BlockAdded { .. }))
        .count();
    assert_eq!(districts_added, city.district_count());
    assert_eq!(blocks_added, city.block_count());
}

#[test]
fn test_district_events_follow_their_edges() {
    let mut city = coarse_city();
    city.add_seed_marker(p(0.5, 0.5));
    run(&mut city, &grid_field());
    let events = city.take_events();

    for (i, event) in events.iter().enumerate() {
        if let CityEvent::Region {
            owner: RegionKey::District(id),
            ..
        } = event
        {
            let announced = events[..i]
                .iter()
                .any(|e| *e == CityEvent::DistrictAdded(*id));
            assert!(announced, "edge event of {id:?} before the district");
        }
    }
}

#[test]
fn test_rerun_is_deterministic() {
    let summary = |city: &City| -> Vec<(RegionKey, Point, Point, usize)> {
        city.edges()
            .map(|(owner, e)| (owner, e.v1(), e.v2(), e.trace().len()))
            .collect()
    };
    let a = generated_city();
    let b = generated_city();
    assert_eq!(summary(&a), summary(&b));
    assert_eq!(a.block_count(), b.block_count());
}

#[test]
fn test_district_edges_are_local_or_boundary() {
    let city = generated_city();
    for district in city.districts() {
        for edge in district.region().tracer().edges() {
            assert!(edge.kind() == EdgeKind::MinorRoad || edge.kind() == EdgeKind::Boundary);
        }
    }
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

#[test]
fn test_remove_district_reports_blocks_then_district() {
    let mut city = generated_city();
    city.take_events();
    let Some(id) = city.districts().next().map(|d| d.id()) else {
        panic!("no district generated");
    };
    let blocks = city.district(id).map_or(0, |d| d.block_count());

    city.remove_district(id).unwrap();
    assert!(city.district(id).is_none());
    let events = city.take_events();
    assert_eq!(events.last(), Some(&CityEvent::DistrictRemoved(id)));
    let removed = events
        .iter()
        .filter(|e| matches!(e, CityEvent::BlockRemoved { .. }))
        .count();
    assert_eq!(removed, blocks);

    assert!(matches!(
        city.remove_district(id),
        Err(GenerationError::DistrictNotFound(d)) if d == id
    ));
}

#[test]
fn test_remove_edge_routes_by_owner() {
    let mut city = City::default();
    city.trace_init();
    let id = city.region().tracer().edges().next().map(|e| e.id()).unwrap();

    assert!(city.remove_edge(RegionKey::City, id).is_ok());
    assert!(matches!(
        city.remove_edge(RegionKey::City, id),
        Err(GenerationError::EdgeNotFound { .. })
    ));
    assert!(matches!(
        city.remove_edge(RegionKey::District(DistrictId(7)), id),
        Err(GenerationError::DistrictNotFound(DistrictId(7)))
    ));
}

#[test]
fn test_clear_keeps_markers_and_reset_drops_them() {
    let mut city = generated_city();
    city.clear();
    assert_eq!(city.phase(), CityPhase::MajorRoads);
    assert_eq!(city.edge_count(), 0);
    assert_eq!(city.district_count(), 0);
    assert_eq!(city.seed_markers(), &[p(0.5, 0.5)]);

    city.reset();
    assert!(city.seed_markers().is_empty());
}

#[test]
fn test_set_params_reloads_one_tier() {
    let mut city = generated_city();
    let local = TracerParams {
        dist_sep: 0.05,
        ..TracerParams::local()
    };
    city.set_params(RoadTier::Local, local);

    assert_eq!(city.params(RoadTier::Local).dist_sep, 0.05);
    assert_eq!(city.params(RoadTier::Major).dist_sep, 0.25);
    for district in city.districts() {
        assert_eq!(district.region().tracer().params().dist_sep, 0.05);
    }
}

#[test]
fn test_muted_city_still_reports_districts() {
    let mut city = coarse_city();
    city.add_seed_marker(p(0.5, 0.5));
    city.set_muted(true);
    run(&mut city, &grid_field());

    let events = city.take_events();
    assert!(events.iter().all(|e| !matches!(e, CityEvent::Region { .. })));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, CityEvent::DistrictAdded(_)))
            .count(),
        city.district_count()
    );
}

// ---------------------------------------------------------------------------
// Districts and blocks
// ---------------------------------------------------------------------------

#[test]
fn test_district_init_traces_closed_outline() {
    let square = Polygon::new(vec![p(0.2, 0.2), p(0.6, 0.2), p(0.6, 0.6), p(0.2, 0.6)]);
    let mut district = District::new(DistrictId(0), square, TracerParams::local());
    assert!(district.contains(p(0.4, 0.4)));
    assert!(!district.contains(p(0.7, 0.4)));

    district.trace_init();
    let region = district.region();
    assert!(region.seeder().contains(district.polygon().centroid()));
    assert_eq!(region.tracer().edge_count(), 1);
    let outline = region.tracer().edges().next().unwrap();
    assert_eq!(outline.kind(), EdgeKind::Boundary);
    assert!(outline.is_loop());
}

#[test]
fn test_parcel_requires_matching_areas() {
    let base = Polygon::new(vec![p(0.0, 0.0), p(0.2, 0.0), p(0.2, 0.2), p(0.0, 0.2)]);
    let straight = Block::new(&base, base.clone());
    let parcel = straight.parcel().expect("parcel");
    assert!((parcel.area() - 0.04 * 0.64).abs() < 1e-6);
    assert!(parcel.centroid().distance(base.centroid()) < 1e-6);

    let bulged = Polygon::new(vec![
        p(0.0, 0.0),
        p(0.1, -0.05),
        p(0.2, 0.0),
        p(0.2, 0.2),
        p(0.0, 0.2),
    ]);
    let curved = Block::new(&base, bulged);
    assert!(curved.parcel().is_none());
    assert!(curved.area() > base.area());
}
