//! Streamline tracer: grows road edges along a tensor field and resolves
//! where they meet the existing network.
//!
//! ## Design
//!
//! A [`Tracer`] owns every edge of one road tier in an arena keyed by
//! [`EdgeId`], plus two [`SpatialGrid`]s: one over vertices and one over
//! trace samples. Each mutating operation returns a [`ChangeSet`] listing
//! the edges it added and removed, in order, so the owning region can keep
//! its graph mirror and event stream in step without callbacks.
//!
//! Distances scale with `dist_sep`, which a population raster can tighten
//! locally (denser areas get closer roads).

mod integrate;
mod params;
mod resolve;
mod spatial;

use std::collections::BTreeMap;

use bevy::prelude::*;

pub use integrate::integrate;
pub use params::{RoadTier, TracerParams};
pub use spatial::{Located, SamplePoint, SpatialGrid};

use crate::edge::{ChangeSet, Edge, EdgeId, EdgeKind};
use crate::geometry::Point;
use crate::raster::PopulationMap;

pub struct Tracer {
    tier: RoadTier,
    params: TracerParams,
    population: Option<PopulationMap>,
    vertices: SpatialGrid<Point>,
    samples: SpatialGrid<SamplePoint>,
    edges: BTreeMap<EdgeId, Edge>,
    /// Edge ids per vertex, one entry per incident endpoint.
    incidence: BTreeMap<Point, Vec<EdgeId>>,
    next_edge_id: u32,
}

impl Tracer {
    pub fn new(tier: RoadTier, params: TracerParams) -> Self {
        Self {
            tier,
            params,
            population: None,
            vertices: SpatialGrid::default(),
            samples: SpatialGrid::default(),
            edges: BTreeMap::new(),
            incidence: BTreeMap::new(),
            next_edge_id: 0,
        }
    }

    pub fn for_tier(tier: RoadTier) -> Self {
        Self::new(tier, TracerParams::for_tier(tier))
    }

    pub fn tier(&self) -> RoadTier {
        self.tier
    }

    pub fn params(&self) -> &TracerParams {
        &self.params
    }

    /// Swaps in new parameters. Existing edges are left as traced.
    pub fn reconfigure(&mut self, params: TracerParams) {
        self.params = params;
    }

    pub fn population_map(&self) -> Option<&PopulationMap> {
        self.population.as_ref()
    }

    pub fn set_population_map(&mut self, map: Option<PopulationMap>) {
        self.population = map;
    }

    fn road_kind(&self) -> EdgeKind {
        self.tier.edge_kind()
    }

    // -----------------------------------------------------------------------
    // Derived distances
    // -----------------------------------------------------------------------

    /// Road separation at `p`, tightened where population is high.
    pub fn dist_sep_at(&self, p: Point) -> f32 {
        match &self.population {
            Some(map) => self.params.dist_sep * (1.5 - map.sample(p).clamp(0.0, 1.0)),
            None => self.params.dist_sep,
        }
    }

    pub fn dist_test(&self, p: Point) -> f32 {
        self.dist_sep_at(p) * self.params.koef_test
    }

    pub fn dist_segment(&self, p: Point) -> f32 {
        self.dist_sep_at(p) * self.params.koef_segment
    }

    pub fn dist_lookahead(&self, p: Point) -> f32 {
        self.dist_segment(p) * self.params.koef_lookahead
    }

    pub fn dist_connect(&self) -> f32 {
        self.params.dist_sep * self.params.koef_connect
    }

    /// Sample-to-sample distance below which a trace counts as touching.
    pub fn dist_touch(&self) -> f32 {
        let s = self.params.dist_sample;
        2.0 * ((s / 2.0).powi(2) + s * s).sqrt()
    }

    // -----------------------------------------------------------------------
    // Edge arena
    // -----------------------------------------------------------------------

    /// Stores a new edge and indexes its vertices and samples. Returns a
    /// snapshot of the stored edge.
    pub fn add_edge(&mut self, v1: Point, v2: Point, trace: Vec<Point>, kind: EdgeKind) -> Edge {
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        for &point in &trace {
            self.samples.insert(SamplePoint { point, edge: id });
        }
        for v in [v1, v2] {
            self.vertices.insert(v);
            self.incidence.entry(v).or_default().push(id);
        }

        let edge = Edge::new(id, v1, v2, trace, kind);
        self.edges.insert(id, edge.clone());
        edge
    }

    /// Drops an edge from the arena. Vertices left without edges are
    /// dropped as well.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(&id)?;

        for &point in edge.trace() {
            self.samples.remove(&SamplePoint { point, edge: id });
        }
        for v in [edge.v1(), edge.v2()] {
            let orphaned = match self.incidence.get_mut(&v) {
                Some(ids) => {
                    ids.retain(|e| *e != id);
                    ids.is_empty()
                }
                None => false,
            };
            if orphaned {
                self.incidence.remove(&v);
                self.vertices.remove(&v);
            }
        }
        Some(edge)
    }

    /// Distinct edges with an endpoint at `v`, in id order.
    pub fn find_edges_at(&self, v: Point) -> Vec<&Edge> {
        let Some(ids) = self.incidence.get(&v) else {
            return Vec::new();
        };
        let mut ids = ids.clone();
        ids.sort();
        ids.dedup();
        ids.iter().filter_map(|id| self.edges.get(id)).collect()
    }

    /// First edge running from `v1` to `v2` (or either way round when
    /// `ignore_order` is set).
    pub fn find_edge(&self, v1: Point, v2: Point, ignore_order: bool) -> Option<&Edge> {
        self.find_edges_at(v1)
            .into_iter()
            .find(|e| e.connects(v1, v2, ignore_order))
    }

    pub fn contains_edge(&self, v1: Point, v2: Point) -> bool {
        self.find_edge(v1, v2, true).is_some()
    }

    pub fn contains_vertex(&self, v: Point) -> bool {
        self.incidence.contains_key(&v)
    }

    pub fn nearest_vertex(&self, p: Point, radius: f32) -> Option<Point> {
        self.vertices.nearest(p, radius)
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.incidence.keys().copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Removes everything and returns the dropped edges.
    pub fn clear(&mut self) -> Vec<Edge> {
        let edges = std::mem::take(&mut self.edges);
        self.incidence.clear();
        self.vertices.clear();
        self.samples.clear();
        trace!("{} tracer cleared, {} edges dropped", self.tier.name(), edges.len());
        edges.into_values().collect()
    }

    // -----------------------------------------------------------------------
    // Edge surgery
    // -----------------------------------------------------------------------

    /// Splits an edge at one of its trace samples, which becomes a vertex.
    ///
    /// Returns the two new halves followed by the removed original, or an
    /// empty set when the sample is the first or last one of the trace.
    pub fn split_edge(&mut self, id: EdgeId, at: Point) -> ChangeSet {
        let mut changes = ChangeSet::new();
        let Some(edge) = self.edges.get(&id) else {
            warn!("split of unknown edge {id:?}");
            return changes;
        };
        let Some(mid) = edge.trace().iter().position(|p| *p == at) else {
            warn!("split point {at} is not a sample of edge {id:?}");
            return changes;
        };
        let left = edge.trace()[..mid].to_vec();
        let right = edge.trace()[mid + 1..].to_vec();
        if left.is_empty() || right.is_empty() {
            return changes;
        }
        let (v1, v2, kind) = (edge.v1(), edge.v2(), edge.kind());

        let l = self.add_edge(v1, at, left, kind);
        let r = self.add_edge(at, v2, right, kind);
        changes.push_added(l);
        changes.push_added(r);
        if let Some(old) = self.remove_edge(id) {
            changes.push_removed(old);
        }
        changes
    }

    /// Prunes dead-end roads and merges chains through degree-two vertices.
    ///
    /// Every listed vertex with a single road edge loses that edge. The
    /// first degree-two vertex whose edges can be joined is replaced by the
    /// joined edge, after which the pass stops. Callers repeat until the
    /// returned set is empty.
    pub fn simplify(&mut self, vertices: &[Point]) -> ChangeSet {
        let mut added = ChangeSet::new();
        let mut removed = ChangeSet::new();

        for &v in vertices {
            let at: Vec<EdgeId> = self.find_edges_at(v).iter().map(|e| e.id()).collect();
            match at.as_slice() {
                [only] => {
                    let is_road = self.edges.get(only).is_some_and(|e| e.is_road());
                    if is_road {
                        if let Some(edge) = self.remove_edge(*only) {
                            removed.push_removed(edge);
                        }
                    }
                }
                [a, b] => {
                    let (Some(ea), Some(eb)) = (self.edges.get(a), self.edges.get(b)) else {
                        continue;
                    };
                    let Some(joined) = ea.join(eb) else {
                        continue;
                    };
                    if self.contains_edge(joined.v1, joined.v2) {
                        continue;
                    }
                    let (a, b) = (*a, *b);
                    let edge = self.add_edge(joined.v1, joined.v2, joined.trace, joined.kind);
                    added.push_added(edge);
                    for id in [a, b] {
                        if let Some(old) = self.remove_edge(id) {
                            removed.push_removed(old);
                        }
                    }
                    break;
                }
                _ => {}
            }
        }

        added.extend(removed);
        added
    }
}
