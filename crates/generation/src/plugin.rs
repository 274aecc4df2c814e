//! Bevy integration: resources, the tracing driver and event forwarding.
//!
//! # Update phases (`GenerationSet`)
//!
//! ```text
//! Configure  →  Trace  →  Notify
//! ```
//!
//! * **Configure**: Pushes edits of the [`GenerationConfig`] resource into
//!   the live model.
//! * **Trace**: Advances the city according to [`TraceDriver`].
//! * **Notify**: Drains the model outbox into Bevy events, so readers see
//!   this frame's changes in the same frame.

use bevy::prelude::*;

use crate::city::{BlockId, DistrictId};
use crate::edge::Edge;
use crate::events::{CityEvent, FieldChange, RegionEvent, RegionKey};
use crate::geometry::Point;
use crate::model::{CityModel, RunSummary};
use crate::settings::GenerationConfig;

// =============================================================================
// Sets
// =============================================================================

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenerationSet {
    Configure,
    Trace,
    Notify,
}

// =============================================================================
// Driver
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    /// Nothing runs until the host steps the model itself.
    #[default]
    Paused,
    /// Runs up to `steps_per_update` phase-machine steps every frame.
    Stepped { steps_per_update: usize },
    /// Runs the whole city in one frame, then pauses.
    RunToCompletion,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct TraceDriver {
    pub mode: TraceMode,
    /// Steps taken since the driver was created.
    pub total_steps: usize,
    pub last_run: Option<RunSummary>,
}

impl TraceDriver {
    pub fn stepped(steps_per_update: usize) -> Self {
        Self {
            mode: TraceMode::Stepped { steps_per_update },
            ..Default::default()
        }
    }

    pub fn run_to_completion() -> Self {
        Self {
            mode: TraceMode::RunToCompletion,
            ..Default::default()
        }
    }
}

// =============================================================================
// Events
// =============================================================================

#[derive(Event, Debug, Clone)]
pub struct EdgeAdded {
    pub owner: RegionKey,
    pub edge: Edge,
}

/// Carries the edge as it was just before removal.
#[derive(Event, Debug, Clone)]
pub struct EdgeRemoved {
    pub owner: RegionKey,
    pub edge: Edge,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SeedAdded {
    pub owner: RegionKey,
    pub point: Point,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SeedRemoved {
    pub owner: RegionKey,
    pub point: Point,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DistrictAdded {
    pub district: DistrictId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct DistrictRemoved {
    pub district: DistrictId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BlockAdded {
    pub district: DistrictId,
    pub block: BlockId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BlockRemoved {
    pub district: DistrictId,
    pub block: BlockId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct FieldChanged {
    pub change: FieldChange,
}

// =============================================================================
// Plugin
// =============================================================================

pub struct GenerationPlugin;

impl Plugin for GenerationPlugin {
    fn build(&self, app: &mut App) {
        // CityModel reads the config when it is created, so a config inserted
        // before the plugin is honoured.
        app.init_resource::<GenerationConfig>()
            .init_resource::<CityModel>()
            .init_resource::<TraceDriver>()
            .add_event::<EdgeAdded>()
            .add_event::<EdgeRemoved>()
            .add_event::<SeedAdded>()
            .add_event::<SeedRemoved>()
            .add_event::<DistrictAdded>()
            .add_event::<DistrictRemoved>()
            .add_event::<BlockAdded>()
            .add_event::<BlockRemoved>()
            .add_event::<FieldChanged>()
            .configure_sets(
                Update,
                (
                    GenerationSet::Configure,
                    GenerationSet::Trace,
                    GenerationSet::Notify,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    apply_config_changes.in_set(GenerationSet::Configure),
                    drive_tracing.in_set(GenerationSet::Trace),
                    forward_model_events.in_set(GenerationSet::Notify),
                ),
            );
    }
}

// =============================================================================
// Systems
// =============================================================================

fn apply_config_changes(config: Res<GenerationConfig>, mut model: ResMut<CityModel>) {
    if !config.is_changed() {
        return;
    }
    for tier in model.apply_config(&config) {
        info!("reloaded {} tracer parameters", tier.name());
    }
}

fn drive_tracing(
    mut driver: ResMut<TraceDriver>,
    mut model: ResMut<CityModel>,
    config: Res<GenerationConfig>,
) {
    match driver.mode {
        TraceMode::Paused => {}
        TraceMode::Stepped { steps_per_update } => {
            let mut steps = 0;
            while steps < steps_per_update && model.trace_step() {
                steps += 1;
            }
            driver.total_steps += steps;
        }
        TraceMode::RunToCompletion => {
            let summary = model.run_to_completion(config.max_steps);
            driver.total_steps += summary.steps;
            driver.last_run = Some(summary);
            driver.mode = TraceMode::Paused;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn forward_model_events(
    mut model: ResMut<CityModel>,
    mut edges_added: EventWriter<EdgeAdded>,
    mut edges_removed: EventWriter<EdgeRemoved>,
    mut seeds_added: EventWriter<SeedAdded>,
    mut seeds_removed: EventWriter<SeedRemoved>,
    mut districts_added: EventWriter<DistrictAdded>,
    mut districts_removed: EventWriter<DistrictRemoved>,
    mut blocks_added: EventWriter<BlockAdded>,
    mut blocks_removed: EventWriter<BlockRemoved>,
    mut field_changed: EventWriter<FieldChanged>,
) {
    let events = model.take_events();
    if events.is_empty() {
        return;
    }
    trace!("forwarding {} generation events", events.len());

    for event in events {
        match event {
            CityEvent::Region { owner, event } => match event {
                RegionEvent::EdgeAdded(edge) => {
                    edges_added.send(EdgeAdded { owner, edge });
                }
                RegionEvent::EdgeRemoved(edge) => {
                    edges_removed.send(EdgeRemoved { owner, edge });
                }
                RegionEvent::SeedAdded(point) => {
                    seeds_added.send(SeedAdded { owner, point });
                }
                RegionEvent::SeedRemoved(point) => {
                    seeds_removed.send(SeedRemoved { owner, point });
                }
            },
            CityEvent::DistrictAdded(district) => {
                districts_added.send(DistrictAdded { district });
            }
            CityEvent::DistrictRemoved(district) => {
                districts_removed.send(DistrictRemoved { district });
            }
            CityEvent::BlockAdded { district, block } => {
                blocks_added.send(BlockAdded { district, block });
            }
            CityEvent::BlockRemoved { district, block } => {
                blocks_removed.send(BlockRemoved { district, block });
            }
            CityEvent::FieldChanged(change) => {
                field_changed.send(FieldChanged { change });
            }
        }
    }
}
