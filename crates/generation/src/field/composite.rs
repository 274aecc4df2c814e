use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    BasisField, BasisFieldId, BasisSumField, BoundaryField, DiscreteField, HeightField,
    TensorField,
};
use crate::config::{
    BOUNDARY_LATTICE_DIM, DEFAULT_BOUNDARY_DECAY, DEFAULT_USER_DECAY, DEFAULT_WEIGHT_BOUNDARY,
    DEFAULT_WEIGHT_HEIGHT, DEFAULT_WEIGHT_USER, HEIGHT_LATTICE_DIM,
};
use crate::error::GenerationError;
use crate::geometry::Point;
use crate::raster::{BoundaryMap, HeightMap};
use crate::tensor::Tensor;

/// One of the three inputs blended by [`CityField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldLayer {
    Height,
    Boundary,
    User,
}

impl FieldLayer {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "height" => Some(FieldLayer::Height),
            "boundary" => Some(FieldLayer::Boundary),
            "userEdit" => Some(FieldLayer::User),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldLayer::Height => "height",
            FieldLayer::Boundary => "boundary",
            FieldLayer::User => "userEdit",
        }
    }
}

/// Tunables for the blended field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub height_weight: f32,
    pub boundary_weight: f32,
    pub user_weight: f32,
    pub boundary_decay: f32,
    pub user_decay: f32,
    /// Normalize every non-zero result to unit magnitude.
    pub normalize: bool,
    pub height_resolution: usize,
    pub boundary_resolution: usize,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            height_weight: DEFAULT_WEIGHT_HEIGHT,
            boundary_weight: DEFAULT_WEIGHT_BOUNDARY,
            user_weight: DEFAULT_WEIGHT_USER,
            boundary_decay: DEFAULT_BOUNDARY_DECAY,
            user_decay: DEFAULT_USER_DECAY,
            normalize: true,
            height_resolution: HEIGHT_LATTICE_DIM,
            boundary_resolution: BOUNDARY_LATTICE_DIM,
        }
    }
}

impl FieldSettings {
    pub fn weight(&self, layer: FieldLayer) -> f32 {
        match layer {
            FieldLayer::Height => self.height_weight,
            FieldLayer::Boundary => self.boundary_weight,
            FieldLayer::User => self.user_weight,
        }
    }

    /// Both lattice resolutions must be at least one.
    pub fn validate(&self) -> Result<(), GenerationError> {
        for (key, value) in [
            ("field/height_resolution", self.height_resolution),
            ("field/boundary_resolution", self.boundary_resolution),
        ] {
            if value == 0 {
                return Err(GenerationError::InvalidParameter {
                    key: key.to_string(),
                    value: value as f32,
                });
            }
        }
        Ok(())
    }

    /// Swaps a zero resolution for the one in `fallback`.
    fn with_valid_resolutions(mut self, fallback: &FieldSettings) -> Self {
        if self.height_resolution == 0 {
            warn!(
                "height lattice resolution must be positive, keeping {}",
                fallback.height_resolution
            );
            self.height_resolution = fallback.height_resolution;
        }
        if self.boundary_resolution == 0 {
            warn!(
                "boundary lattice resolution must be positive, keeping {}",
                fallback.boundary_resolution
            );
            self.boundary_resolution = fallback.boundary_resolution;
        }
        self
    }
}

/// The host-side blend of user edits, terrain and region borders.
///
/// Height and boundary layers are baked onto lattices whenever their input
/// changes, so evaluation cost is dominated by the user basis sum. Points
/// inside obstacle regions of the boundary map evaluate to zero.
#[derive(Debug, Clone)]
pub struct CityField {
    settings: FieldSettings,
    user: BasisSumField,
    height: HeightField,
    boundary: BoundaryField,
    boundary_map: Option<BoundaryMap>,
    height_lattice: DiscreteField,
    boundary_lattice: DiscreteField,
}

impl Default for CityField {
    fn default() -> Self {
        Self::new(FieldSettings::default())
    }
}

impl CityField {
    /// A zero lattice resolution falls back to the default one.
    pub fn new(settings: FieldSettings) -> Self {
        let settings = settings.with_valid_resolutions(&FieldSettings::default());
        let mut boundary = BoundaryField::default();
        boundary.set_decay(settings.boundary_decay);
        Self {
            user: BasisSumField::new(settings.user_decay),
            height: HeightField::default(),
            boundary,
            boundary_map: None,
            height_lattice: DiscreteField::new(settings.height_resolution),
            boundary_lattice: DiscreteField::new(settings.boundary_resolution),
            settings,
        }
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    /// Replaces all tunables and re-bakes whatever they affect. A zero
    /// lattice resolution keeps the current one.
    pub fn apply_settings(&mut self, settings: FieldSettings) {
        let settings = settings.with_valid_resolutions(&self.settings);
        let rebake_height = settings.height_resolution != self.settings.height_resolution;
        let rebake_boundary = settings.boundary_resolution != self.settings.boundary_resolution
            || settings.boundary_decay != self.settings.boundary_decay;
        self.user.set_decay(settings.user_decay);
        self.boundary.set_decay(settings.boundary_decay);
        if rebake_height {
            self.height_lattice = DiscreteField::new(settings.height_resolution);
        }
        if rebake_boundary {
            self.boundary_lattice = DiscreteField::new(settings.boundary_resolution);
        }
        self.settings = settings;
        if rebake_height {
            self.rebake_height();
        }
        if rebake_boundary {
            self.rebake_boundary();
        }
    }

    // -----------------------------------------------------------------------
    // User basis fields
    // -----------------------------------------------------------------------

    pub fn user(&self) -> &BasisSumField {
        &self.user
    }

    pub fn insert_basis(&mut self, field: BasisField) -> BasisFieldId {
        self.user.insert(field)
    }

    pub fn remove_basis(&mut self, id: BasisFieldId) -> Option<BasisField> {
        self.user.remove(id)
    }

    pub fn replace_basis(&mut self, id: BasisFieldId, field: BasisField) -> Option<BasisField> {
        self.user.replace(id, field)
    }

    // -----------------------------------------------------------------------
    // Raster layers
    // -----------------------------------------------------------------------

    pub fn height_map(&self) -> Option<&HeightMap> {
        self.height.map()
    }

    pub fn set_height_map(&mut self, map: Option<HeightMap>) {
        self.height.set_map(map);
        self.rebake_height();
    }

    pub fn boundary_map(&self) -> Option<&BoundaryMap> {
        self.boundary_map.as_ref()
    }

    pub fn set_boundary_map(&mut self, map: Option<BoundaryMap>) {
        self.boundary.set_map(map.as_ref());
        self.boundary_map = map;
        self.rebake_boundary();
    }

    fn rebake_height(&mut self) {
        if self.height.map().is_some() {
            self.height_lattice.load_values(&self.height);
        } else {
            self.height_lattice.clear();
        }
    }

    fn rebake_boundary(&mut self) {
        if self.boundary.element_count() > 0 {
            self.boundary_lattice.load_values(&self.boundary);
        } else {
            self.boundary_lattice.clear();
        }
    }

    // -----------------------------------------------------------------------
    // Weights and decay
    // -----------------------------------------------------------------------

    pub fn set_weight(&mut self, layer: FieldLayer, weight: f32) {
        match layer {
            FieldLayer::Height => self.settings.height_weight = weight,
            FieldLayer::Boundary => self.settings.boundary_weight = weight,
            FieldLayer::User => self.settings.user_weight = weight,
        }
    }

    /// The height layer has no decay; setting it is ignored.
    pub fn set_decay(&mut self, layer: FieldLayer, decay: f32) {
        match layer {
            FieldLayer::Height => debug!("height layer has no decay, ignoring {decay}"),
            FieldLayer::Boundary => {
                self.settings.boundary_decay = decay;
                self.boundary.set_decay(decay);
                self.rebake_boundary();
            }
            FieldLayer::User => {
                self.settings.user_decay = decay;
                self.user.set_decay(decay);
            }
        }
    }

    /// Name-addressed variant of [`Self::set_weight`]; returns the layer
    /// that changed.
    pub fn set_weight_by_name(&mut self, name: &str, weight: f32) -> Option<FieldLayer> {
        let Some(layer) = FieldLayer::from_name(name) else {
            debug!("unknown field layer: {name}");
            return None;
        };
        self.set_weight(layer, weight);
        Some(layer)
    }

    pub fn set_decay_by_name(&mut self, name: &str, decay: f32) -> Option<FieldLayer> {
        let Some(layer) = FieldLayer::from_name(name) else {
            debug!("unknown field layer: {name}");
            return None;
        };
        self.set_decay(layer, decay);
        Some(layer)
    }

    pub fn set_normalize(&mut self, normalize: bool) {
        self.settings.normalize = normalize;
    }
}

impl TensorField for CityField {
    fn evaluate(&self, p: Point) -> Tensor {
        if let Some(map) = &self.boundary_map {
            if map.is_obstacle(p) {
                return Tensor::ZERO;
            }
        }

        let s = &self.settings;
        let t = s.height_weight * self.height_lattice.evaluate(p)
            + s.boundary_weight * self.boundary_lattice.evaluate(p)
            + s.user_weight * self.user.evaluate(p);

        let n = t.value();
        if n > 0.0 && (s.normalize || n > 1.0) {
            t / n
        } else {
            t
        }
    }
}
