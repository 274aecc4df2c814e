use crate::config::{PARCEL_AREA_TOLERANCE, PARCEL_SCALE};
use crate::geometry::Polygon;

/// Handle to a block inside its district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

/// A face of a district's local road network.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    polygon: Polygon,
    parcel: Option<Polygon>,
}

impl Block {
    /// `base` is the polygon through the face's junctions only, `border`
    /// the full traced outline. A block gets a buildable parcel only when
    /// the two agree in area, i.e. the bounding roads are straight enough.
    pub fn new(base: &Polygon, border: Polygon) -> Self {
        let parcel = ((base.area() - border.area()).abs() <= PARCEL_AREA_TOLERANCE)
            .then(|| border.scaled(PARCEL_SCALE));
        Self {
            polygon: border,
            parcel,
        }
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn parcel(&self) -> Option<&Polygon> {
        self.parcel.as_ref()
    }

    pub fn area(&self) -> f32 {
        self.polygon.area()
    }
}
