//! The host-facing generator: a [`City`] paired with the [`CityField`] that
//! drives it.
//!
//! Field edits go through the model so the city's seeder learns about new
//! singularities and observers get a [`FieldChange`]. Network edits go
//! straight to [`CityModel::city_mut`]; their events surface through the
//! same [`CityModel::take_events`] outbox.

use bevy::prelude::*;

use crate::city::{City, DistrictId};
use crate::error::GenerationError;
use crate::events::{CityEvent, FieldChange, RegionEvent};
use crate::field::{BasisField, BasisFieldId, CityField, FieldLayer, FieldSettings};
use crate::geometry::Point;
use crate::raster::{BoundaryMap, HeightMap, PopulationMap};
use crate::settings::GenerationConfig;
use crate::tracer::RoadTier;

/// Outcome of [`CityModel::run_to_completion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub steps: usize,
    /// `false` when the step cap stopped the run.
    pub finished: bool,
}

#[derive(Resource)]
pub struct CityModel {
    city: City,
    field: CityField,
    events: Vec<CityEvent>,
}

impl FromWorld for CityModel {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<GenerationConfig>() {
            Some(config) => Self::new(config),
            None => Self::new(&GenerationConfig::default()),
        }
    }
}

impl CityModel {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            city: City::new(config.major, config.local),
            field: CityField::new(config.field.clone()),
            events: Vec::new(),
        }
    }

    pub fn city(&self) -> &City {
        &self.city
    }

    pub fn city_mut(&mut self) -> &mut City {
        &mut self.city
    }

    pub fn field(&self) -> &CityField {
        &self.field
    }

    /// Drains everything recorded since the last call, in emission order.
    pub fn take_events(&mut self) -> Vec<CityEvent> {
        self.drain_city();
        std::mem::take(&mut self.events)
    }

    fn drain_city(&mut self) {
        let events = self.city.take_events();
        self.events.extend(events);
    }

    fn field_changed(&mut self, change: FieldChange) {
        self.drain_city();
        self.events.push(CityEvent::FieldChanged(change));
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    /// One step of the city's phase machine. Returns `false` once done.
    pub fn trace_step(&mut self) -> bool {
        self.city.trace_step(&self.field)
    }

    /// Steps until the city is done or `max_steps` have run.
    ///
    /// Per-edge and per-seed events are suppressed during the run. Instead
    /// every edge present beforehand is reported removed up front and every
    /// edge present afterwards is reported added at the end.
    pub fn run_to_completion(&mut self, max_steps: usize) -> RunSummary {
        self.drain_city();
        let removed: Vec<CityEvent> = self
            .city
            .edges()
            .map(|(owner, edge)| CityEvent::Region {
                owner,
                event: RegionEvent::EdgeRemoved(edge.clone()),
            })
            .collect();
        self.events.extend(removed);

        self.city.set_muted(true);
        let mut summary = RunSummary::default();
        while summary.steps < max_steps {
            if !self.city.trace_step(&self.field) {
                summary.finished = true;
                break;
            }
            summary.steps += 1;
        }
        self.city.set_muted(false);
        self.drain_city();

        let added: Vec<CityEvent> = self
            .city
            .edges()
            .map(|(owner, edge)| CityEvent::Region {
                owner,
                event: RegionEvent::EdgeAdded(edge.clone()),
            })
            .collect();
        self.events.extend(added);

        if summary.finished {
            info!(
                "city finished in {} steps: {} districts, {} blocks",
                summary.steps,
                self.city.district_count(),
                self.city.block_count()
            );
        } else {
            warn!("city still {:?} after {max_steps} steps", self.city.phase());
        }
        summary
    }

    // -----------------------------------------------------------------------
    // User basis fields
    // -----------------------------------------------------------------------

    pub fn insert_basis(&mut self, field: BasisField) -> BasisFieldId {
        let id = self.field.insert_basis(field);
        self.user_field_changed();
        id
    }

    pub fn remove_basis(&mut self, id: BasisFieldId) -> Option<BasisField> {
        let removed = self.field.remove_basis(id)?;
        self.user_field_changed();
        Some(removed)
    }

    /// Moves, rescales or reshapes an existing element.
    pub fn replace_basis(&mut self, id: BasisFieldId, field: BasisField) -> Option<BasisField> {
        let old = self.field.replace_basis(id, field)?;
        self.user_field_changed();
        Some(old)
    }

    fn user_field_changed(&mut self) {
        let singularities: Vec<Point> = self.field.user().singularities().collect();
        self.city.set_singularities(singularities);
        self.field_changed(FieldChange::User);
    }

    // -----------------------------------------------------------------------
    // Raster inputs
    // -----------------------------------------------------------------------

    pub fn set_height_map(&mut self, map: Option<HeightMap>) {
        self.field.set_height_map(map);
        self.field_changed(FieldChange::Height);
    }

    /// The map shapes both the boundary field layer and the city's boundary
    /// roads and seed priorities.
    pub fn set_boundary_map(&mut self, map: Option<BoundaryMap>) {
        self.field.set_boundary_map(map.clone());
        self.city.set_boundary_map(map);
        self.field_changed(FieldChange::Boundary);
    }

    pub fn set_population_map(&mut self, map: Option<PopulationMap>) {
        self.city.set_population_map(map);
        self.field_changed(FieldChange::Population);
    }

    // -----------------------------------------------------------------------
    // Tunables
    // -----------------------------------------------------------------------

    pub fn set_weight(&mut self, layer: FieldLayer, weight: f32) {
        self.field.set_weight(layer, weight);
        self.field_changed(FieldChange::Weights);
    }

    pub fn set_decay(&mut self, layer: FieldLayer, decay: f32) {
        self.field.set_decay(layer, decay);
        self.field_changed(FieldChange::Weights);
    }

    /// Returns `false` for an unknown layer name.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) -> bool {
        let changed = self.field.set_weight_by_name(name, weight).is_some();
        if changed {
            self.field_changed(FieldChange::Weights);
        }
        changed
    }

    pub fn set_decay_by_name(&mut self, name: &str, decay: f32) -> bool {
        let changed = self.field.set_decay_by_name(name, decay).is_some();
        if changed {
            self.field_changed(FieldChange::Weights);
        }
        changed
    }

    pub fn apply_field_settings(&mut self, settings: FieldSettings) {
        if *self.field.settings() == settings {
            return;
        }
        self.field.apply_settings(settings);
        self.field_changed(FieldChange::Weights);
    }

    /// Pushes whatever differs between `config` and the live parameters.
    /// Returns the tiers that were reloaded.
    pub fn apply_config(&mut self, config: &GenerationConfig) -> Vec<RoadTier> {
        let mut reloaded = Vec::new();
        for tier in [RoadTier::Major, RoadTier::Local] {
            let params = *config.tier(tier);
            if *self.city.params(tier) != params {
                self.city.set_params(tier, params);
                reloaded.push(tier);
            }
        }
        self.apply_field_settings(config.field.clone());
        reloaded
    }

    // -----------------------------------------------------------------------
    // Shortcuts
    // -----------------------------------------------------------------------

    pub fn remove_district(&mut self, id: DistrictId) -> Result<(), GenerationError> {
        self.city.remove_district(id)
    }

    /// Restarts generation, keeping seed markers and inputs.
    pub fn clear(&mut self) {
        self.city.clear();
    }

    /// Restarts generation and drops every input, including user basis
    /// fields.
    pub fn reset(&mut self) {
        self.city.reset();
        let ids: Vec<BasisFieldId> = self.field.user().iter().map(|(id, _)| id).collect();
        for id in ids {
            self.field.remove_basis(id);
        }
        self.field.set_height_map(None);
        self.field.set_boundary_map(None);
        self.city.set_singularities(Vec::new());
        self.field_changed(FieldChange::User);
    }
}
