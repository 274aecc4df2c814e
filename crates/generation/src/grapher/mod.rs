//! Undirected vertex graph mirroring a tracer's network, used to find dead
//! ends, pass-through vertices and the enclosed faces.
//!
//! ## Design
//!
//! The graph only records which vertices are joined, never by which edge.
//! Parallel tracer edges collapse into one graph edge, so the owning region
//! is responsible for disconnecting only when the last of them goes.
//! Vertices are ordered by [`Point`]'s total order, which makes iteration
//! and cycle extraction deterministic.

mod cycles;

use std::collections::BTreeMap;

use pathfinding::prelude::connected_components;

use crate::geometry::Point;

#[derive(Debug, Clone, Default)]
pub struct Grapher {
    adjacency: BTreeMap<Point, Vec<Point>>,
}

impl Grapher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins `a` and `b`. Returns `false` for self-loops and pairs that are
    /// already joined.
    pub fn connect(&mut self, a: Point, b: Point) -> bool {
        if a == b || self.is_connected(a, b) {
            return false;
        }
        self.adjacency.entry(a).or_default().push(b);
        self.adjacency.entry(b).or_default().push(a);
        true
    }

    /// Separates `a` and `b`, dropping either vertex if it is left isolated.
    pub fn disconnect(&mut self, a: Point, b: Point) -> bool {
        if !self.is_connected(a, b) {
            return false;
        }
        for (from, to) in [(a, b), (b, a)] {
            let emptied = match self.adjacency.get_mut(&from) {
                Some(list) => {
                    list.retain(|v| *v != to);
                    list.is_empty()
                }
                None => false,
            };
            if emptied {
                self.adjacency.remove(&from);
            }
        }
        true
    }

    pub fn is_connected(&self, a: Point, b: Point) -> bool {
        self.adjacency.get(&a).is_some_and(|list| list.contains(&b))
    }

    pub fn degree(&self, v: Point) -> usize {
        self.adjacency.get(&v).map_or(0, |list| list.len())
    }

    pub fn neighbours(&self, v: Point) -> &[Point] {
        self.adjacency.get(&v).map_or(&[], |list| list.as_slice())
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Every edge once, as `(v1, v2)` with `v1 < v2`.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        self.adjacency
            .iter()
            .flat_map(|(&a, list)| list.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|l| l.len()).sum::<usize>() / 2
    }

    /// Degree-two vertices.
    pub fn bridges(&self) -> Vec<Point> {
        self.with_degree(2)
    }

    /// Degree-one vertices.
    pub fn dongles(&self) -> Vec<Point> {
        self.with_degree(1)
    }

    fn with_degree(&self, degree: usize) -> Vec<Point> {
        self.adjacency
            .iter()
            .filter(|(_, list)| list.len() == degree)
            .map(|(&v, _)| v)
            .collect()
    }

    pub fn component_count(&self) -> usize {
        let starts: Vec<Point> = self.vertices().collect();
        connected_components(&starts, |v| self.neighbours(*v).to_vec()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn clear(&mut self) {
        self.adjacency.clear();
    }
}
