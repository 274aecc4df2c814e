//! # TestGenerator: headless harness for the generation plugin
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + [`GenerationPlugin`] and
//! records every generation event after each update, so tests can assert on
//! the full event history instead of racing Bevy's two-frame event buffers.

mod queries;

use bevy::app::App;
use bevy::math::Vec2;
use bevy::prelude::*;

use crate::field::BasisField;
use crate::geometry::Point;
use crate::model::RunSummary;
use crate::plugin::{
    BlockAdded, BlockRemoved, DistrictAdded, DistrictRemoved, EdgeAdded, EdgeRemoved,
    FieldChanged, GenerationPlugin, SeedAdded, SeedRemoved, TraceDriver, TraceMode,
};
use crate::settings::GenerationConfig;

/// Everything the plugin emitted since the log was last taken.
#[derive(Debug, Default)]
pub struct EventLog {
    pub edges_added: Vec<EdgeAdded>,
    pub edges_removed: Vec<EdgeRemoved>,
    pub seeds_added: Vec<SeedAdded>,
    pub seeds_removed: Vec<SeedRemoved>,
    pub districts_added: Vec<DistrictAdded>,
    pub districts_removed: Vec<DistrictRemoved>,
    pub blocks_added: Vec<BlockAdded>,
    pub blocks_removed: Vec<BlockRemoved>,
    pub field_changed: Vec<FieldChanged>,
}

impl EventLog {
    pub fn is_empty(&self) -> bool {
        self.edges_added.is_empty()
            && self.edges_removed.is_empty()
            && self.seeds_added.is_empty()
            && self.seeds_removed.is_empty()
            && self.districts_added.is_empty()
            && self.districts_removed.is_empty()
            && self.blocks_added.is_empty()
            && self.blocks_removed.is_empty()
            && self.field_changed.is_empty()
    }
}

/// A headless Bevy App running [`GenerationPlugin`].
///
/// Use the builder methods to seed the model, then `update()` or
/// `run_to_completion()` and inspect the model or the [`EventLog`].
pub struct TestGenerator {
    app: App,
    log: EventLog,
}

impl Default for TestGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TestGenerator {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Default configuration, paused driver, no inputs.
    pub fn new() -> Self {
        Self::with_config(GenerationConfig::default())
    }

    /// `config` is inserted before the plugin, so the model is built from it.
    pub fn with_config(config: GenerationConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(config);
        app.add_plugins(GenerationPlugin);
        app.update();

        let mut generator = Self {
            app,
            log: EventLog::default(),
        };
        generator.collect();
        generator
    }

    /// Coarse spacing and a single horizontal basis field with a seed marker
    /// in the middle, which finishes in a few hundred steps.
    pub fn grid_city() -> Self {
        let mut config = GenerationConfig::default();
        config.major.dist_sep = 0.25;
        config.local.dist_sep = 0.1;
        config.field.user_decay = 1.0;
        Self::with_config(config)
            .with_basis(BasisField::regular(Point::new(0.5, 0.5), 1.0, Vec2::X))
            .with_seed_marker(Point::new(0.5, 0.5))
    }

    // -----------------------------------------------------------------------
    // Setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_basis(mut self, field: BasisField) -> Self {
        self.model_mut().insert_basis(field);
        self
    }

    pub fn with_seed_marker(mut self, p: Point) -> Self {
        self.model_mut().city_mut().add_seed_marker(p);
        self
    }

    pub fn with_mode(mut self, mode: TraceMode) -> Self {
        self.set_mode(mode);
        self
    }

    // -----------------------------------------------------------------------
    // Running
    // -----------------------------------------------------------------------

    /// One app update, then records whatever the plugin emitted.
    pub fn update(&mut self) {
        self.app.update();
        self.collect();
    }

    pub fn update_n(&mut self, n: usize) {
        for _ in 0..n {
            self.update();
        }
    }

    /// Switches the driver to run-to-completion and runs one update.
    pub fn run_to_completion(&mut self) -> RunSummary {
        self.set_mode(TraceMode::RunToCompletion);
        self.update();
        self.driver().last_run.unwrap_or_default()
    }

    pub fn set_mode(&mut self, mode: TraceMode) {
        self.app.world_mut().resource_mut::<TraceDriver>().mode = mode;
    }

    fn collect(&mut self) {
        let world = self.app.world_mut();
        let log = &mut self.log;
        log.edges_added.extend(world.resource_mut::<Events<EdgeAdded>>().drain());
        log.edges_removed.extend(world.resource_mut::<Events<EdgeRemoved>>().drain());
        log.seeds_added.extend(world.resource_mut::<Events<SeedAdded>>().drain());
        log.seeds_removed.extend(world.resource_mut::<Events<SeedRemoved>>().drain());
        log.districts_added.extend(world.resource_mut::<Events<DistrictAdded>>().drain());
        log.districts_removed.extend(world.resource_mut::<Events<DistrictRemoved>>().drain());
        log.blocks_added.extend(world.resource_mut::<Events<BlockAdded>>().drain());
        log.blocks_removed.extend(world.resource_mut::<Events<BlockRemoved>>().drain());
        log.field_changed.extend(world.resource_mut::<Events<FieldChanged>>().drain());
    }
}
