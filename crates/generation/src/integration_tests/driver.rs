use crate::events::{FieldChange, RegionKey};
use crate::geometry::Point;
use crate::plugin::TraceMode;
use crate::settings::GenerationConfig;
use crate::test_harness::TestGenerator;

/// Upper bound on updates for stepped runs.
const MAX_UPDATES: usize = 10_000;

fn edge_summary(gen: &TestGenerator) -> Vec<(RegionKey, Point, Point)> {
    gen.model()
        .city()
        .edges()
        .map(|(owner, e)| (owner, e.v1(), e.v2()))
        .collect()
}

fn run_stepped(gen: &mut TestGenerator) {
    let mut updates = 0;
    while !gen.is_done() {
        gen.update();
        updates += 1;
        assert!(updates < MAX_UPDATES, "stepped run did not finish");
    }
    // One more so the final events are forwarded.
    gen.update();
}

#[test]
fn test_paused_driver_leaves_city_untouched() {
    let mut gen = TestGenerator::grid_city();
    gen.update_n(5);

    assert_eq!(gen.edge_count(), 0);
    assert_eq!(gen.driver().total_steps, 0);
    let log = gen.log();
    assert!(log.edges_added.is_empty());
    assert_eq!(log.field_changed.len(), 1);
    assert_eq!(log.field_changed[0].change, FieldChange::User);
}

#[test]
fn test_run_to_completion_reports_final_network() {
    let mut gen = TestGenerator::grid_city();
    gen.take_log();

    let summary = gen.run_to_completion();
    assert!(summary.finished);
    assert!(gen.is_done());
    assert_eq!(gen.driver().mode, TraceMode::Paused);
    assert_eq!(gen.driver().total_steps, summary.steps);
    assert!(gen.district_count() > 0);

    let log = gen.take_log();
    assert_eq!(log.edges_added.len(), gen.edge_count());
    assert!(log.edges_removed.is_empty());
    assert!(log.seeds_added.is_empty());
    assert!(log.seeds_removed.is_empty());
    assert_eq!(log.districts_added.len(), gen.district_count());
    assert_eq!(log.blocks_added.len(), gen.block_count());

    // Paused again afterwards.
    gen.update_n(3);
    assert!(gen.log().is_empty());
}

#[test]
fn test_stepped_events_net_to_final_network() {
    let mut gen = TestGenerator::grid_city().with_mode(TraceMode::Stepped {
        steps_per_update: 25,
    });
    gen.update();
    assert!(gen.driver().total_steps > 0);
    assert!(gen.driver().total_steps <= 25);

    run_stepped(&mut gen);
    let log = gen.take_log();
    assert_eq!(
        log.edges_added.len() - log.edges_removed.len(),
        gen.edge_count()
    );

    let city = gen.model().city();
    let queued: usize = city.region().seeds().len()
        + city
            .districts()
            .map(|d| d.region().seeds().len())
            .sum::<usize>();
    assert_eq!(log.seeds_added.len() - log.seeds_removed.len(), queued);
    assert_eq!(log.districts_added.len(), gen.district_count());
}

#[test]
fn test_stepped_and_one_shot_runs_agree() {
    let mut stepped = TestGenerator::grid_city().with_mode(TraceMode::Stepped {
        steps_per_update: 50,
    });
    run_stepped(&mut stepped);

    let mut one_shot = TestGenerator::grid_city();
    one_shot.run_to_completion();

    assert_eq!(edge_summary(&stepped), edge_summary(&one_shot));
    assert_eq!(stepped.block_count(), one_shot.block_count());
}

#[test]
fn test_step_cap_from_config() {
    let config = GenerationConfig {
        max_steps: 5,
        ..GenerationConfig::default()
    };
    let mut gen = TestGenerator::with_config(config)
        .with_seed_marker(Point::new(0.5, 0.5))
        .with_basis(crate::field::BasisField::regular(
            Point::new(0.5, 0.5),
            1.0,
            bevy::math::Vec2::Y,
        ));

    let summary = gen.run_to_completion();
    assert_eq!(summary.steps, 5);
    assert!(!summary.finished);
    assert!(!gen.is_done());
}
