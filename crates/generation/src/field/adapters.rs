use std::f32::consts::FRAC_PI_2;

use super::{BasisField, BasisSumField, TensorField};
use crate::config::{BOUNDARY_ELEMENT_SPACING, DEFAULT_BOUNDARY_DECAY, HEIGHT_GRADIENT_GAIN};
use crate::geometry::{Point, Polygon, Rect};
use crate::raster::border::find_regions;
use crate::raster::{BoundaryMap, HeightMap};
use crate::tensor::Tensor;

/// Pixel stride used for the height gradient.
const GRADIENT_STRIDE: usize = 2;

// ---------------------------------------------------------------------------
// HeightField
// ---------------------------------------------------------------------------

/// Orients roads along the contour lines of a height map.
///
/// The magnitude grows with slope, so steep terrain dominates flat terrain
/// when blended with other layers. Without a map this is the zero field.
#[derive(Debug, Clone, Default)]
pub struct HeightField {
    map: Option<HeightMap>,
}

impl HeightField {
    pub fn new(map: Option<HeightMap>) -> Self {
        Self { map }
    }

    pub fn map(&self) -> Option<&HeightMap> {
        self.map.as_ref()
    }

    pub fn set_map(&mut self, map: Option<HeightMap>) {
        self.map = map;
    }
}

impl TensorField for HeightField {
    fn evaluate(&self, p: Point) -> Tensor {
        let Some(map) = &self.map else {
            return Tensor::ZERO;
        };
        let (col, row) = map.pixel_at(p);
        if col + GRADIENT_STRIDE >= map.width() || row + GRADIENT_STRIDE >= map.height() {
            return Tensor::ZERO;
        }

        let h0 = *map.pixel(col, row);
        let hx = *map.pixel(col + GRADIENT_STRIDE, row);
        // Rows grow downwards, so the pixel below is lower in field space.
        let hy = *map.pixel(col, row + GRADIENT_STRIDE);

        let gx = HEIGHT_GRADIENT_GAIN * (hx - h0);
        // Field y points up, against the row order, hence `h0 - hy`. The
        // gradient stays in field space and diagonal contours keep their
        // orientation.
        let gy = HEIGHT_GRADIENT_GAIN * (h0 - hy);
        Tensor::new(gx.hypot(gy), gy.atan2(gx) + FRAC_PI_2)
    }
}

// ---------------------------------------------------------------------------
// BoundaryField
// ---------------------------------------------------------------------------

/// Aligns roads with the borders of labelled regions (shorelines, parks).
///
/// Each border chain is walked and a regular element tangent to the chain is
/// dropped every [`BOUNDARY_ELEMENT_SPACING`] of field distance.
#[derive(Debug, Clone)]
pub struct BoundaryField {
    sum: BasisSumField,
}

impl Default for BoundaryField {
    fn default() -> Self {
        Self {
            sum: BasisSumField::new(DEFAULT_BOUNDARY_DECAY),
        }
    }
}

impl BoundaryField {
    pub fn from_map(map: &BoundaryMap) -> Self {
        let mut field = Self::default();
        field.set_map(Some(map));
        field
    }

    /// Rebuilds the elements from `map`; `None` leaves an empty field.
    pub fn set_map(&mut self, map: Option<&BoundaryMap>) {
        self.sum.clear();
        let Some(map) = map else {
            return;
        };

        for chains in find_regions(map).values() {
            for chain in chains {
                let Some(&(c0, r0)) = chain.first() else {
                    continue;
                };
                let mut anchor = map.to_field_coords(c0 as f32, r0 as f32);
                for &(col, row) in chain {
                    let next = map.to_field_coords(col as f32, row as f32);
                    let d = next - anchor;
                    if d.length() > BOUNDARY_ELEMENT_SPACING {
                        self.sum.insert(BasisField::regular(anchor, 1.0, d));
                        anchor = next;
                    }
                }
            }
        }
    }

    pub fn element_count(&self) -> usize {
        self.sum.len()
    }

    pub fn decay(&self) -> f32 {
        self.sum.decay()
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.sum.set_decay(decay);
    }
}

impl TensorField for BoundaryField {
    fn evaluate(&self, p: Point) -> Tensor {
        self.sum.evaluate(p)
    }
}

// ---------------------------------------------------------------------------
// PolygonMask
// ---------------------------------------------------------------------------

/// Restricts a field to the inside of a polygon; zero elsewhere.
pub struct PolygonMask<'a> {
    inner: &'a dyn TensorField,
    polygon: &'a Polygon,
    bounds: Option<Rect>,
}

impl<'a> PolygonMask<'a> {
    pub fn new(inner: &'a dyn TensorField, polygon: &'a Polygon) -> Self {
        Self {
            inner,
            polygon,
            bounds: polygon.bounding_rect(),
        }
    }
}

impl TensorField for PolygonMask<'_> {
    fn evaluate(&self, p: Point) -> Tensor {
        match self.bounds {
            Some(bounds) if bounds.contains(p) && self.polygon.contains(p) => {
                self.inner.evaluate(p)
            }
            _ => Tensor::ZERO,
        }
    }
}
