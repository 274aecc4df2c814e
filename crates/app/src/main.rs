use bevy::log::LogPlugin;
use bevy::prelude::*;

use generation::plugin::{DistrictAdded, GenerationSet};
use generation::{CityModel, GenerationConfig, GenerationPlugin, TraceDriver};

mod demo;

use demo::{build_demo_city, DemoSeed};

const DEFAULT_SEED: u64 = 1;
const STEPS_PER_UPDATE: usize = 64;

fn main() {
    let seed = std::env::var("CITYGEN_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let driver = match std::env::var("CITYGEN_MODE").as_deref() {
        Ok("stepped") => TraceDriver::stepped(STEPS_PER_UPDATE),
        _ => TraceDriver::run_to_completion(),
    };

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(load_config())
        .add_plugins(GenerationPlugin)
        .insert_resource(driver)
        .insert_resource(DemoSeed(seed))
        .add_systems(Startup, build_demo_city)
        .add_systems(
            Update,
            (log_districts, exit_when_done)
                .chain()
                .after(GenerationSet::Notify),
        );

    app.run();
}

/// `CITYGEN_CONFIG` names a JSON file; anything unreadable falls back to the
/// defaults.
fn load_config() -> GenerationConfig {
    let Ok(path) = std::env::var("CITYGEN_CONFIG") else {
        return GenerationConfig::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => GenerationConfig::from_json_or_warn(&json),
        Err(e) => {
            warn!("cannot read {path}: {e}, using default config");
            GenerationConfig::default()
        }
    }
}

fn log_districts(mut added: EventReader<DistrictAdded>) {
    for event in added.read() {
        debug!("district {:?} added", event.district);
    }
}

fn exit_when_done(
    model: Res<CityModel>,
    driver: Res<TraceDriver>,
    config: Res<GenerationConfig>,
    mut exit: EventWriter<AppExit>,
) {
    let city = model.city();
    let out_of_steps = driver.total_steps >= config.max_steps;
    if !city.is_done() && !out_of_steps {
        return;
    }
    if out_of_steps && !city.is_done() {
        warn!("stopping after {} steps, city still {:?}", driver.total_steps, city.phase());
    }
    info!(
        "{} edges, {} districts, {} blocks in {} steps",
        city.edge_count(),
        city.district_count(),
        city.block_count(),
        driver.total_steps
    );
    exit.send(AppExit::Success);
}
