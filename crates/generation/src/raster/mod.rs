//! Raster map inputs (height, boundary, population) and their mapping to
//! field space.
//!
//! Field `x` in `[0,1]` maps to column `x * (width - 1)`. Field `y` maps to
//! row `(1 - y) * (height - 1)` because field space has its origin at the
//! bottom-left while rasters start at the top-left.

pub mod border;
mod noise;

use bevy::math::Vec2;

use crate::geometry::Point;

/// Heights in `[0,1]`.
pub type HeightMap = Raster<f32>;
/// Population density in `[0,1]`; denser areas get tighter road spacing.
pub type PopulationMap = Raster<f32>;
/// Region labels. `None` is open background; `Some(label)` marks a region
/// such as water. Labels above zero are obstacles that roads cannot enter.
pub type BoundaryMap = Raster<Option<u16>>;

/// Row-major pixel grid with `(col, row)` addressing.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    width: usize,
    height: usize,
    pixels: Vec<T>,
}

impl<T: Clone> Raster<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        assert!(width > 0 && height > 0, "raster must not be empty");
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }
}

impl<T> Raster<T> {
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        assert!(width > 0 && height > 0, "raster must not be empty");
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(col, row));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps an existing pixel buffer; `None` if the length does not match.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<T>) -> Option<Self> {
        (width > 0 && height > 0 && pixels.len() == width * height).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.width && (row as usize) < self.height
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.width && row < self.height,
            "pixel ({col}, {row}) out of range for {}x{} raster",
            self.width,
            self.height
        );
        row * self.width + col
    }

    pub fn pixel(&self, col: usize, row: usize) -> &T {
        &self.pixels[self.index(col, row)]
    }

    pub fn set(&mut self, col: usize, row: usize, value: T) {
        let idx = self.index(col, row);
        self.pixels[idx] = value;
    }

    /// Continuous pixel coordinates of a field point, clamped to the raster.
    pub fn to_raster_coords(&self, p: Point) -> Vec2 {
        let p = p.clamp_unit();
        let max_col = (self.width - 1) as f32;
        let max_row = (self.height - 1) as f32;
        Vec2::new(p.x() * max_col, max_row - p.y() * max_row)
    }

    /// Field point for continuous pixel coordinates.
    pub fn to_field_coords(&self, col: f32, row: f32) -> Point {
        let max_col = ((self.width - 1) as f32).max(1.0);
        let max_row = ((self.height - 1) as f32).max(1.0);
        Point::new(col / max_col, (max_row - row) / max_row)
    }

    /// Pixel nearest to a field point.
    pub fn pixel_at(&self, p: Point) -> (usize, usize) {
        let c = self.to_raster_coords(p).round();
        (c.x as usize, c.y as usize)
    }

    pub fn sample(&self, p: Point) -> &T {
        let (col, row) = self.pixel_at(p);
        self.pixel(col, row)
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }
}

impl Raster<Option<u16>> {
    /// True where the map marks an obstacle region (label above zero).
    pub fn is_obstacle(&self, p: Point) -> bool {
        matches!(self.sample(p), Some(label) if *label > 0)
    }
}
