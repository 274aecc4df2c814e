use bevy::prelude::*;

use super::{EventLog, TestGenerator};
use crate::model::CityModel;
use crate::plugin::TraceDriver;
use crate::settings::GenerationConfig;

impl TestGenerator {
    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn model(&self) -> &CityModel {
        self.resource::<CityModel>()
    }

    pub fn model_mut(&mut self) -> Mut<'_, CityModel> {
        self.app.world_mut().resource_mut::<CityModel>()
    }

    pub fn driver(&self) -> &TraceDriver {
        self.resource::<TraceDriver>()
    }

    /// Mutable access marks the config changed, so the next update
    /// reloads it.
    pub fn config_mut(&mut self) -> Mut<'_, GenerationConfig> {
        self.app.world_mut().resource_mut::<GenerationConfig>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Returns the recorded events and starts a fresh log.
    pub fn take_log(&mut self) -> EventLog {
        std::mem::take(&mut self.log)
    }

    // -----------------------------------------------------------------------
    // Shortcuts
    // -----------------------------------------------------------------------

    pub fn edge_count(&self) -> usize {
        self.model().city().edge_count()
    }

    pub fn district_count(&self) -> usize {
        self.model().city().district_count()
    }

    pub fn block_count(&self) -> usize {
        self.model().city().block_count()
    }

    pub fn is_done(&self) -> bool {
        self.model().city().is_done()
    }
}
