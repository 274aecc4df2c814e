//! Runtime tunables: per-tier tracer parameters and field blending.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::field::{FieldLayer, FieldSettings};
use crate::tracer::{RoadTier, TracerParams};

/// Default step cap for run-to-completion.
pub const DEFAULT_MAX_STEPS: usize = 200_000;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub major: TracerParams,
    pub local: TracerParams,
    pub field: FieldSettings,
    /// Run-to-completion gives up after this many steps.
    pub max_steps: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            major: TracerParams::major(),
            local: TracerParams::local(),
            field: FieldSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl GenerationConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GenerationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        self.field.validate()
    }

    /// Like [`Self::from_json`], but logs the error and falls back to the
    /// defaults.
    pub fn from_json_or_warn(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("generation config: {e}, falling back to defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, GenerationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn tier(&self, tier: RoadTier) -> &TracerParams {
        match tier {
            RoadTier::Major => &self.major,
            RoadTier::Local => &self.local,
        }
    }

    pub fn tier_mut(&mut self, tier: RoadTier) -> &mut TracerParams {
        match tier {
            RoadTier::Major => &mut self.major,
            RoadTier::Local => &mut self.local,
        }
    }

    /// Sets one value by path:
    ///
    /// - `tracer/<major|local>/<param>`, e.g. `tracer/local/distSep`
    /// - `field/weight/<height|boundary|userEdit>`
    /// - `field/decay/<boundary|userEdit>`
    pub fn set_named(&mut self, path: &str, value: f32) -> Result<(), GenerationError> {
        let unknown = || GenerationError::UnknownParameter(path.to_string());
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            ["tracer", tier, key] => {
                let tier = RoadTier::from_name(tier).ok_or_else(unknown)?;
                self.tier_mut(tier).set_named(key, value)
            }
            ["field", what, layer] => {
                let layer = FieldLayer::from_name(layer).ok_or_else(unknown)?;
                if !value.is_finite() || value < 0.0 {
                    return Err(GenerationError::InvalidParameter {
                        key: path.to_string(),
                        value,
                    });
                }
                let field = &mut self.field;
                match (*what, layer) {
                    ("weight", FieldLayer::Height) => field.height_weight = value,
                    ("weight", FieldLayer::Boundary) => field.boundary_weight = value,
                    ("weight", FieldLayer::User) => field.user_weight = value,
                    ("decay", FieldLayer::Boundary) => field.boundary_decay = value,
                    ("decay", FieldLayer::User) => field.user_decay = value,
                    _ => return Err(unknown()),
                }
                Ok(())
            }
            _ => Err(unknown()),
        }
    }
}
