use crate::city::{BlockId, DistrictId};
use crate::edge::Edge;
use crate::geometry::Point;

// =============================================================================
// Owners
// =============================================================================

/// Which region's tracer owns an edge or seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKey {
    City,
    District(DistrictId),
}

// =============================================================================
// Region outbox
// =============================================================================

/// Network change recorded by a single region.
///
/// Removals carry the edge as it was just before it left the tracer.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    EdgeAdded(Edge),
    EdgeRemoved(Edge),
    SeedAdded(Point),
    SeedRemoved(Point),
}

impl RegionEvent {
    pub fn is_edge(&self) -> bool {
        matches!(self, Self::EdgeAdded(_) | Self::EdgeRemoved(_))
    }
}

// =============================================================================
// City outbox
// =============================================================================

/// Input of the blended field that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldChange {
    Height,
    Boundary,
    Population,
    User,
    Weights,
}

/// Everything the host can observe about a city, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum CityEvent {
    Region { owner: RegionKey, event: RegionEvent },
    DistrictAdded(DistrictId),
    DistrictRemoved(DistrictId),
    BlockAdded { district: DistrictId, block: BlockId },
    BlockRemoved { district: DistrictId, block: BlockId },
    FieldChanged(FieldChange),
}
