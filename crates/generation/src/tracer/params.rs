use serde::{Deserialize, Serialize};

use crate::edge::EdgeKind;
use crate::error::GenerationError;

/// Which layer of the road hierarchy a tracer builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoadTier {
    Major,
    Local,
}

impl RoadTier {
    pub fn edge_kind(self) -> EdgeKind {
        match self {
            RoadTier::Major => EdgeKind::MajorRoad,
            RoadTier::Local => EdgeKind::MinorRoad,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoadTier::Major => "major",
            RoadTier::Local => "local",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "major" => Some(RoadTier::Major),
            "local" | "minor" => Some(RoadTier::Local),
            _ => None,
        }
    }
}

/// Distances that steer streamline tracing. Every distance except
/// `dist_sample` is derived from `dist_sep` through one of the `koef_*`
/// multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracerParams {
    /// Target separation between parallel roads.
    pub dist_sep: f32,
    /// Look-ahead radius for hitting existing roads, as a fraction of `dist_sep`.
    pub koef_test: f32,
    /// Maximum edge length, as a multiple of `dist_sep`.
    pub koef_segment: f32,
    /// Extra tracing beyond the segment length, as a multiple of `dist_sep`.
    pub koef_lookahead: f32,
    /// Radius for snapping onto existing vertices, as a fraction of `dist_sep`.
    pub koef_connect: f32,
    /// Spacing of trace samples.
    pub dist_sample: f32,
}

impl Default for TracerParams {
    fn default() -> Self {
        Self::major()
    }
}

impl TracerParams {
    pub fn major() -> Self {
        Self {
            dist_sep: 0.06,
            koef_test: 0.6,
            koef_segment: 1.5,
            koef_lookahead: 0.5,
            koef_connect: 0.15,
            dist_sample: 0.002,
        }
    }

    pub fn local() -> Self {
        Self {
            dist_sep: 0.015,
            ..Self::major()
        }
    }

    pub fn for_tier(tier: RoadTier) -> Self {
        match tier {
            RoadTier::Major => Self::major(),
            RoadTier::Local => Self::local(),
        }
    }

    /// Sets one parameter by name. Accepts both `distSep` and `dist_sep`
    /// spellings. Values must be finite and positive.
    pub fn set_named(&mut self, key: &str, value: f32) -> Result<(), GenerationError> {
        let slot = match key {
            "distSep" | "dist_sep" => &mut self.dist_sep,
            "koefTest" | "koef_test" => &mut self.koef_test,
            "koefSegment" | "koef_segment" => &mut self.koef_segment,
            "koefLookahead" | "koef_lookahead" => &mut self.koef_lookahead,
            "koefConnect" | "koef_connect" => &mut self.koef_connect,
            "distSample" | "dist_sample" => &mut self.dist_sample,
            _ => return Err(GenerationError::UnknownParameter(key.to_string())),
        };
        if !value.is_finite() || value <= 0.0 {
            return Err(GenerationError::InvalidParameter {
                key: key.to_string(),
                value,
            });
        }
        *slot = value;
        Ok(())
    }
}
