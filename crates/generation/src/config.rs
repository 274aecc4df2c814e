// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// Fixed Runge-Kutta step length in field units.
pub const RK4_STEP: f32 = 0.0005;
/// Hard cap on integration steps per sample.
pub const INSTEP_MAX: usize = 1000;

// ---------------------------------------------------------------------------
// Spatial search
// ---------------------------------------------------------------------------

/// Default cells per axis for vertex and sample-point grids.
pub const SPATIAL_GRID_SIZE: usize = 20;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

pub const DEFAULT_BASIS_DECAY: f32 = 4.0;
pub const DEFAULT_BOUNDARY_DECAY: f32 = 4.0;
pub const DEFAULT_USER_DECAY: f32 = 130.0;
/// Distance floor in the nearness weighting.
pub const MIN_BASIS_DISTANCE: f32 = 0.001;

pub const DEFAULT_WEIGHT_HEIGHT: f32 = 0.3;
pub const DEFAULT_WEIGHT_BOUNDARY: f32 = 0.3;
pub const DEFAULT_WEIGHT_USER: f32 = 0.7;

pub const HEIGHT_LATTICE_DIM: usize = 20;
pub const BOUNDARY_LATTICE_DIM: usize = 256;

pub const HEIGHT_GRADIENT_GAIN: f32 = 100.0;
/// Field distance between consecutive boundary-tangent elements.
pub const BOUNDARY_ELEMENT_SPACING: f32 = 0.02;

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Minimum border step that becomes a seeder boundary segment.
pub const SEEDER_BOUNDARY_STEP: f32 = 0.01;

// ---------------------------------------------------------------------------
// Subdivision
// ---------------------------------------------------------------------------

/// Parcel shrink factor about the block centroid.
pub const PARCEL_SCALE: f32 = 0.8;
/// Max base/border area mismatch for a block to get a parcel.
pub const PARCEL_AREA_TOLERANCE: f32 = 0.0001;

/// Boundary polyline ends snap to existing samples within this many
/// touch distances.
pub const BOUNDARY_SNAP_FACTOR: f32 = 1.2;
