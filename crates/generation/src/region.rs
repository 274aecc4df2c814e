//! Shared tracing loop for the city and its districts.
//!
//! A [`Region`] owns one tier's tracer together with the seed queue and the
//! connectivity graph that mirror it. Every tracer change-set is replayed
//! through [`Region::apply`], which keeps the graph in step, re-seeds from
//! new vertices and records [`RegionEvent`]s in the region's outbox.

use bevy::prelude::*;

use crate::edge::{ChangeSet, Edge, EdgeChange, EdgeId};
use crate::error::GenerationError;
use crate::events::{RegionEvent, RegionKey};
use crate::field::TensorField;
use crate::geometry::{Point, Polygon};
use crate::grapher::Grapher;
use crate::raster::{BoundaryMap, PopulationMap};
use crate::seeder::{Seed, Seeder};
use crate::tracer::{RoadTier, Tracer, TracerParams};

/// An edge of a cycle, with `forward` set when the cycle runs `v1 -> v2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    pub forward: bool,
}

/// A closed face of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Subregion {
    pub edges: Vec<OrientedEdge>,
    /// Cycle vertices only.
    pub base: Polygon,
    /// Full traced outline.
    pub border: Polygon,
    /// Whether any bounding edge is a road.
    pub has_road: bool,
}

pub struct Region {
    key: RegionKey,
    tracer: Tracer,
    seeder: Seeder,
    grapher: Grapher,
    events: Vec<RegionEvent>,
    muted: bool,
    last_trace_major: bool,
}

impl Region {
    pub fn new(key: RegionKey, tier: RoadTier, params: TracerParams) -> Self {
        Self {
            key,
            tracer: Tracer::new(tier, params),
            seeder: Seeder::new(),
            grapher: Grapher::new(),
            events: Vec::new(),
            muted: false,
            last_trace_major: false,
        }
    }

    pub fn key(&self) -> RegionKey {
        self.key
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn seeder(&self) -> &Seeder {
        &self.seeder
    }

    pub fn grapher(&self) -> &Grapher {
        &self.grapher
    }

    pub fn is_empty(&self) -> bool {
        self.tracer.is_empty() && self.seeder.is_empty()
    }

    pub fn reconfigure(&mut self, params: TracerParams) {
        self.tracer.reconfigure(params);
    }

    pub fn set_population_map(&mut self, map: Option<PopulationMap>) {
        self.tracer.set_population_map(map);
    }

    /// Border segments raise the priority of nearby seeds.
    pub fn set_seed_boundaries(&mut self, map: Option<&BoundaryMap>) {
        self.seeder.set_boundaries(map);
    }

    /// Field singularities raise the priority of nearby seeds.
    pub fn set_singularities(&mut self, points: impl IntoIterator<Item = Point>) {
        self.seeder.clear_singularities();
        for p in points {
            self.seeder.add_singularity(p);
        }
    }

    // -----------------------------------------------------------------------
    // Outbox
    // -----------------------------------------------------------------------

    /// While muted, edge and seed changes are applied but not recorded.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn take_events(&mut self) -> Vec<RegionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: RegionEvent) {
        if !self.muted {
            self.events.push(event);
        }
    }

    // -----------------------------------------------------------------------
    // Seeds
    // -----------------------------------------------------------------------

    pub fn add_seed(&mut self, p: Point) -> bool {
        let added = self.seeder.insert(p);
        if added {
            self.emit(RegionEvent::SeedAdded(p));
        }
        added
    }

    pub fn remove_seed(&mut self, p: Point) -> bool {
        let removed = self.seeder.remove(p);
        if removed {
            self.emit(RegionEvent::SeedRemoved(p));
        }
        removed
    }

    pub fn seeds(&self) -> &[Seed] {
        self.seeder.seeds()
    }

    fn pop_seed(&mut self) -> Option<Point> {
        let seed = self.seeder.pop()?;
        self.emit(RegionEvent::SeedRemoved(seed));
        Some(seed)
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    /// One tracing step. Returns `false` once no seed produces new edges.
    ///
    /// Queued seeds are traced one per call. When the queue runs dry every
    /// dead end and pass-through vertex is queued, and seeds are consumed
    /// until one of them grows the network.
    pub fn trace_field(&mut self, field: &dyn TensorField) -> bool {
        if let Some(seed) = self.pop_seed() {
            self.trace_from(field, seed);
            return true;
        }

        let mut candidates = self.grapher.dongles();
        candidates.extend(self.grapher.bridges());
        for v in candidates {
            self.add_seed(v);
        }

        while let Some(seed) = self.pop_seed() {
            if self.trace_from(field, seed) > 0 {
                return true;
            }
        }
        false
    }

    /// Traces both ways from `p`, alternating the eigenvector from the
    /// previous call and falling back to the other one. Returns the number
    /// of edges added.
    pub fn trace_from(&mut self, field: &dyn TensorField, p: Point) -> usize {
        let major = !self.last_trace_major;
        let mut added = self.trace_both_ways(field, major, p);
        if added == 0 {
            added = self.trace_both_ways(field, !major, p);
        }
        self.last_trace_major = major;
        added
    }

    fn trace_both_ways(&mut self, field: &dyn TensorField, major: bool, p: Point) -> usize {
        let direction = field.evaluate(p).eigenvector(major);
        let mut added = 0;
        for d in [direction, -direction] {
            let changes = self.tracer.trace_field(field, major, p, d);
            added += changes.added().count();
            self.apply(changes, true);
        }
        added
    }

    /// Straight user road. Its vertices are not queued as seeds.
    pub fn trace_line_segment(&mut self, from: Point, to: Point) -> bool {
        let changes = self.tracer.trace_line_segment(from, to);
        let changed = !changes.is_empty();
        self.apply(changes, false);
        changed
    }

    pub fn trace_domain_bounds(&mut self) {
        let changes = self.tracer.trace_domain_bounds();
        self.apply(changes, false);
    }

    pub fn trace_boundary(&mut self, points: &[Point]) {
        let changes = self.tracer.trace_boundary(points);
        self.apply(changes, false);
    }

    pub fn trace_boundaries(&mut self, map: &BoundaryMap) {
        let changes = self.tracer.trace_boundaries(map);
        self.apply(changes, false);
    }

    /// Replays tracer changes into the graph mirror, the seed queue and the
    /// outbox.
    fn apply(&mut self, changes: ChangeSet, reseed: bool) {
        for change in changes {
            match change {
                EdgeChange::Added(edge) => {
                    let v2 = edge.v2();
                    self.grapher.connect(edge.v1(), v2);
                    self.emit(RegionEvent::EdgeAdded(edge));
                    if reseed {
                        self.add_seed(v2);
                    }
                }
                EdgeChange::Removed(edge) => {
                    let (v1, v2) = (edge.v1(), edge.v2());
                    // Parallel edges share one graph edge.
                    if !self.tracer.contains_edge(v1, v2) {
                        self.grapher.disconnect(v1, v2);
                    }
                    self.emit(RegionEvent::EdgeRemoved(edge));
                    for v in [v1, v2] {
                        if !self.tracer.contains_vertex(v) {
                            self.remove_seed(v);
                        }
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GenerationError> {
        let edge = self
            .tracer
            .remove_edge(id)
            .ok_or(GenerationError::EdgeNotFound {
                owner: self.key,
                edge: id,
            })?;
        let mut changes = ChangeSet::new();
        changes.push_removed(edge.clone());
        self.apply(changes, false);
        Ok(edge)
    }

    /// Prunes dead-end roads and merges pass-through chains until nothing
    /// changes.
    pub fn simplify_graph(&mut self) {
        let mut passes = 0;
        loop {
            let mut vertices = self.grapher.bridges();
            vertices.extend(self.grapher.dongles());
            let changes = self.tracer.simplify(&vertices);
            if changes.is_empty() {
                break;
            }
            passes += 1;
            self.apply(changes, false);
        }
        debug!(
            "{:?} simplified in {passes} passes, {} edges left",
            self.key,
            self.tracer.edge_count()
        );
    }

    /// Drops every seed and edge, reporting each.
    pub fn clear(&mut self) {
        while self.pop_seed().is_some() {}
        let mut changes = ChangeSet::new();
        for edge in self.tracer.clear() {
            changes.push_removed(edge);
        }
        self.apply(changes, false);
        self.grapher.clear();
        self.last_trace_major = false;
    }

    // -----------------------------------------------------------------------
    // Faces
    // -----------------------------------------------------------------------

    /// Every face of the minimum cycle basis, smallest first.
    pub fn find_cycles(&self) -> Vec<Subregion> {
        self.grapher
            .cycles()
            .into_iter()
            .map(|cycle| self.map_cycle(cycle))
            .collect()
    }

    /// Faces bounded by at least one road.
    pub fn find_subregions(&self) -> Vec<Subregion> {
        self.find_cycles()
            .into_iter()
            .filter(|s| s.has_road)
            .collect()
    }

    fn map_cycle(&self, cycle: Vec<Point>) -> Subregion {
        let n = cycle.len();
        let mut edges = Vec::with_capacity(n);
        let mut border = Vec::new();
        let mut has_road = false;

        for (i, &a) in cycle.iter().enumerate() {
            let b = cycle[(i + 1) % n];
            let Some(edge) = self.tracer.find_edge(a, b, true) else {
                warn!("{:?}: no edge between cycle vertices {a} and {b}", self.key);
                continue;
            };
            let forward = edge.v1() == a;
            has_road |= edge.is_road();
            edges.push(OrientedEdge {
                edge: edge.id(),
                forward,
            });
            border.push(a);
            if forward {
                border.extend_from_slice(edge.trace());
            } else {
                border.extend(edge.trace_reversed());
            }
        }

        Subregion {
            edges,
            base: Polygon::new(cycle),
            border: Polygon::new(border),
            has_road,
        }
    }
}
