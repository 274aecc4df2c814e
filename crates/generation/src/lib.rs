//! Procedural road networks traced along the streamlines of a tensor field.
//!
//! A [`City`] traces major roads over the unit square, turns the faces they
//! enclose into [`District`]s, fills each district with local roads and
//! finally splits it into [`Block`]s. [`CityModel`] pairs a city with the
//! [`CityField`] that steers it, and [`GenerationPlugin`] runs the model
//! inside a Bevy app.

pub mod city;
pub mod config;
pub mod edge;
pub mod error;
pub mod events;
pub mod field;
pub mod geometry;
pub mod grapher;
pub mod model;
pub mod plugin;
pub mod raster;
pub mod region;
pub mod seeder;
pub mod settings;
pub mod tensor;
pub mod tracer;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

pub use city::{Block, BlockId, City, CityPhase, District, DistrictId};
pub use edge::{Edge, EdgeId, EdgeKind};
pub use error::GenerationError;
pub use events::{CityEvent, FieldChange, RegionEvent, RegionKey};
pub use field::{BasisField, CityField, TensorField};
pub use geometry::{Point, Polygon};
pub use model::{CityModel, RunSummary};
pub use plugin::{GenerationPlugin, GenerationSet, TraceDriver, TraceMode};
pub use settings::GenerationConfig;
pub use tensor::Tensor;
pub use tracer::{RoadTier, TracerParams};
