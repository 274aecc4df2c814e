use bevy::math::Vec2;

use crate::config::SPATIAL_GRID_SIZE;
use crate::edge::EdgeId;
use crate::geometry::{angle_between, snap_zero, Point};

/// Anything with a position in field space.
pub trait Located {
    fn position(&self) -> Point;
}

impl Located for Point {
    fn position(&self) -> Point {
        *self
    }
}

/// A trace sample remembered together with the edge it belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub point: Point,
    pub edge: EdgeId,
}

impl Located for SamplePoint {
    fn position(&self) -> Point {
        self.point
    }
}

/// Uniform bucket grid over the unit square.
///
/// Cells are `1 / size` wide; positions outside the square fall into the
/// nearest border cell. Queries scan the square of cells that covers the
/// search radius and filter by exact distance and sweep angle.
#[derive(Debug, Clone)]
pub struct SpatialGrid<E> {
    size: usize,
    buckets: Vec<Vec<E>>,
}

impl<E> Default for SpatialGrid<E> {
    fn default() -> Self {
        Self::new(SPATIAL_GRID_SIZE)
    }
}

impl<E> SpatialGrid<E> {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            buckets: (0..size * size).map(|_| Vec::new()).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.buckets.iter().flatten()
    }

    #[inline]
    fn cell_coord(&self, v: f32) -> usize {
        let c = (v * self.size as f32).floor();
        if c.is_nan() || c < 0.0 {
            0
        } else {
            (c as usize).min(self.size - 1)
        }
    }

    #[inline]
    fn cell(&self, p: Point) -> (usize, usize) {
        (self.cell_coord(p.x()), self.cell_coord(p.y()))
    }

    #[inline]
    fn flat_index(&self, cx: usize, cy: usize) -> usize {
        cy * self.size + cx
    }
}

impl<E: Located + Clone + PartialEq> SpatialGrid<E> {
    /// Inserts `element`; an identical element already present is kept
    /// instead. Returns whether the grid changed.
    pub fn insert(&mut self, element: E) -> bool {
        let (cx, cy) = self.cell(element.position());
        let idx = self.flat_index(cx, cy);
        let bucket = &mut self.buckets[idx];
        if bucket.contains(&element) {
            return false;
        }
        bucket.push(element);
        true
    }

    /// Removes every element equal to `element`.
    pub fn remove(&mut self, element: &E) -> bool {
        let (cx, cy) = self.cell(element.position());
        let idx = self.flat_index(cx, cy);
        let bucket = &mut self.buckets[idx];
        let before = bucket.len();
        bucket.retain(|e| e != element);
        bucket.len() != before
    }

    pub fn contains(&self, element: &E) -> bool {
        let (cx, cy) = self.cell(element.position());
        self.buckets[self.flat_index(cx, cy)].contains(element)
    }

    /// Elements within `|sweep|` of `p` whose direction from `p` lies within
    /// `half_angle` of `sweep`, nearest first. Elements at `p` itself always match.
    pub fn find(&self, p: Point, sweep: Vec2, half_angle: f32) -> Vec<E> {
        let radius = sweep.length();
        if !radius.is_finite() {
            return Vec::new();
        }
        let reach = (radius * self.size as f32).ceil() as usize;
        let (cx, cy) = self.cell(p);
        let x0 = cx.saturating_sub(reach);
        let y0 = cy.saturating_sub(reach);
        let x1 = (cx + reach).min(self.size - 1);
        let y1 = (cy + reach).min(self.size - 1);

        let mut found: Vec<(f32, E)> = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                for e in &self.buckets[self.flat_index(x, y)] {
                    let q = e.position();
                    let d = p.distance(q);
                    if d > radius {
                        continue;
                    }
                    if snap_zero(d) == 0.0 || angle_between(q - p, sweep) <= half_angle {
                        found.push((d, e.clone()));
                    }
                }
            }
        }
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, e)| e).collect()
    }

    /// Elements within `radius` of `p` in any direction, nearest first.
    pub fn find_within(&self, p: Point, radius: f32) -> Vec<E> {
        self.find(p, Vec2::new(radius, 0.0), std::f32::consts::PI)
    }

    pub fn nearest(&self, p: Point, radius: f32) -> Option<E> {
        self.find_within(p, radius).into_iter().next()
    }
}
