//! Priority queue of points to start traces from.
//!
//! Seeds near region borders and field singularities come out first, so
//! the network grows from the features that shape it.

use crate::config::SEEDER_BOUNDARY_STEP;
use crate::geometry::{segment_distance, Point};
use crate::raster::{border, BoundaryMap};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    pub point: Point,
    pub priority: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Seeder {
    /// Ascending by priority; the highest priority seed is last.
    seeds: Vec<Seed>,
    boundaries: Vec<(Point, Point)>,
    singularities: Vec<Point>,
}

impl Seeder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `p` behind every seed of equal priority. Returns `false` if a
    /// seed already sits at exactly `p`.
    pub fn insert(&mut self, p: Point) -> bool {
        if self.contains(p) {
            return false;
        }
        let priority = self.priority(p);
        let at = self.seeds.partition_point(|s| s.priority <= priority);
        self.seeds.insert(at, Seed { point: p, priority });
        true
    }

    pub fn remove(&mut self, p: Point) -> bool {
        match self.seeds.iter().position(|s| s.point == p) {
            Some(i) => {
                self.seeds.remove(i);
                true
            }
            None => false,
        }
    }

    /// Takes the highest-priority seed.
    pub fn pop(&mut self) -> Option<Point> {
        self.seeds.pop().map(|s| s.point)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.seeds.iter().any(|s| s.point == p)
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Drops queued seeds. Boundaries and singularities stay.
    pub fn clear(&mut self) {
        self.seeds.clear();
    }

    // -----------------------------------------------------------------------
    // Priority inputs
    // -----------------------------------------------------------------------

    /// Replaces the border segments with those of `map`'s region borders.
    /// Consecutive segment ends are at least `SEEDER_BOUNDARY_STEP` apart.
    pub fn set_boundaries(&mut self, map: Option<&BoundaryMap>) {
        self.boundaries.clear();
        let Some(map) = map else {
            return;
        };
        for chains in border::find_regions(map).values() {
            for chain in chains {
                let Some(&(c0, r0)) = chain.first() else {
                    continue;
                };
                let mut a = map.to_field_coords(c0 as f32, r0 as f32);
                for &(c, r) in chain {
                    let b = map.to_field_coords(c as f32, r as f32);
                    if a.distance(b) > SEEDER_BOUNDARY_STEP {
                        self.boundaries.push((a, b));
                        a = b;
                    }
                }
            }
        }
    }

    pub fn boundary_count(&self) -> usize {
        self.boundaries.len()
    }

    pub fn add_singularity(&mut self, p: Point) {
        self.singularities.push(p);
    }

    pub fn remove_singularity(&mut self, p: Point) {
        self.singularities.retain(|s| *s != p);
    }

    pub fn clear_singularities(&mut self) {
        self.singularities.clear();
    }

    pub fn singularities(&self) -> &[Point] {
        &self.singularities
    }

    /// `exp(-d_boundary) + exp(-d_singularity)`, each term zero when there
    /// is nothing of that kind.
    pub fn priority(&self, p: Point) -> f32 {
        let to_boundary = self
            .boundaries
            .iter()
            .map(|&(a, b)| segment_distance(p, a, b))
            .fold(f32::INFINITY, f32::min);
        let to_singularity = self
            .singularities
            .iter()
            .map(|s| s.distance(p))
            .fold(f32::INFINITY, f32::min);
        (-to_boundary).exp() + (-to_singularity).exp()
    }
}
