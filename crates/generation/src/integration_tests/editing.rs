use crate::edge::EdgeKind;
use crate::events::RegionKey;
use crate::geometry::Point;
use crate::test_harness::TestGenerator;

fn generated() -> TestGenerator {
    let mut gen = TestGenerator::grid_city();
    gen.run_to_completion();
    gen.take_log();
    gen
}

#[test]
fn test_line_segment_is_reported_once() {
    let mut gen = TestGenerator::new();
    gen.model_mut()
        .city_mut()
        .trace_line_segment(Point::new(0.2, 0.3), Point::new(0.6, 0.3));
    gen.update();

    let log = gen.take_log();
    assert_eq!(log.edges_added.len(), 1);
    let added = &log.edges_added[0];
    assert_eq!(added.owner, RegionKey::City);
    assert_eq!(added.edge.kind(), EdgeKind::MajorRoad);
    // User roads are not seeded.
    assert!(log.seeds_added.is_empty());

    gen.update();
    assert!(gen.log().is_empty());
}

#[test]
fn test_remove_edge_reports_the_edge() {
    let mut gen = generated();
    let Some(edge) = gen.model().city().region().tracer().edges().next().cloned() else {
        panic!("no major edge generated");
    };

    gen.model_mut()
        .city_mut()
        .remove_edge(RegionKey::City, edge.id())
        .unwrap();
    gen.update();

    let log = gen.take_log();
    assert!(log
        .edges_removed
        .iter()
        .any(|e| e.owner == RegionKey::City && e.edge.id() == edge.id()));
}

#[test]
fn test_remove_district_reports_roads_blocks_and_district() {
    let mut gen = generated();
    let (id, edges, blocks) = {
        let city = gen.model().city();
        let Some(district) = city.districts().next() else {
            panic!("no district generated");
        };
        (
            district.id(),
            district.region().tracer().edge_count(),
            district.block_count(),
        )
    };

    gen.model_mut().remove_district(id).unwrap();
    gen.update();

    let log = gen.take_log();
    assert_eq!(log.districts_removed.len(), 1);
    assert_eq!(log.districts_removed[0].district, id);
    assert_eq!(log.blocks_removed.len(), blocks);
    assert!(log.blocks_removed.iter().all(|b| b.district == id));
    assert_eq!(
        log.edges_removed
            .iter()
            .filter(|e| e.owner == RegionKey::District(id))
            .count(),
        edges
    );
    assert!(gen.model().city().district(id).is_none());
}

#[test]
fn test_clear_reports_everything_and_regenerates() {
    let mut gen = generated();
    let edges = gen.edge_count();
    let districts = gen.district_count();
    let blocks = gen.block_count();

    gen.model_mut().clear();
    gen.update();
    let log = gen.take_log();
    assert_eq!(log.edges_removed.len(), edges);
    assert_eq!(log.districts_removed.len(), districts);
    assert_eq!(log.blocks_removed.len(), blocks);
    assert_eq!(gen.edge_count(), 0);

    // Markers survive, so the same city grows back.
    let summary = gen.run_to_completion();
    assert!(summary.finished);
    assert_eq!(gen.edge_count(), edges);
    assert_eq!(gen.block_count(), blocks);
}
