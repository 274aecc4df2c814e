//! The city: major road network, its districts and their blocks.
//!
//! ## Design
//!
//! [`City::trace_step`] advances a small phase machine ([`CityPhase`]).
//! The city's own [`Region`] grows the major network first; once it runs
//! dry the network is simplified and every road-bounded face becomes a
//! [`District`]. Districts then trace local roads one step at a time in
//! round-robin order, each restricted to its outline. Finished districts
//! are split into [`Block`]s at the end.
//!
//! Region outboxes are drained into one city-wide [`CityEvent`] queue as
//! soon as an operation finishes, so district and block events always come
//! after the edge events that caused them.

mod block;
mod district;
#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, VecDeque};

use bevy::prelude::*;

pub use block::{Block, BlockId};
pub use district::District;

use crate::edge::{Edge, EdgeId};
use crate::error::GenerationError;
use crate::events::{CityEvent, RegionKey};
use crate::field::TensorField;
use crate::geometry::Point;
use crate::raster::{BoundaryMap, PopulationMap};
use crate::region::Region;
use crate::tracer::{RoadTier, TracerParams};

/// Handle to a district inside the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DistrictId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CityPhase {
    #[default]
    MajorRoads,
    Districts,
    Blocks,
    Done,
}

pub struct City {
    region: Region,
    districts: BTreeMap<DistrictId, District>,
    next_district_id: u32,
    /// Districts still tracing, in round-robin order.
    trace_queue: VecDeque<DistrictId>,
    /// Districts done tracing and waiting for block detection.
    block_queue: VecDeque<DistrictId>,
    phase: CityPhase,
    /// Set once markers and bounds are traced; user roads drawn before
    /// that do not count.
    initialized: bool,
    seed_markers: Vec<Point>,
    boundary_map: Option<BoundaryMap>,
    population_map: Option<PopulationMap>,
    local_params: TracerParams,
    events: Vec<CityEvent>,
    muted: bool,
}

impl Default for City {
    fn default() -> Self {
        Self::new(TracerParams::major(), TracerParams::local())
    }
}

impl City {
    pub fn new(major: TracerParams, local: TracerParams) -> Self {
        Self {
            region: Region::new(RegionKey::City, RoadTier::Major, major),
            districts: BTreeMap::new(),
            next_district_id: 0,
            trace_queue: VecDeque::new(),
            block_queue: VecDeque::new(),
            phase: CityPhase::MajorRoads,
            initialized: false,
            seed_markers: Vec::new(),
            boundary_map: None,
            population_map: None,
            local_params: local,
            events: Vec::new(),
            muted: false,
        }
    }

    pub fn phase(&self) -> CityPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == CityPhase::Done
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn districts(&self) -> impl Iterator<Item = &District> {
        self.districts.values()
    }

    pub fn district(&self, id: DistrictId) -> Option<&District> {
        self.districts.get(&id)
    }

    pub fn district_count(&self) -> usize {
        self.districts.len()
    }

    pub fn block_count(&self) -> usize {
        self.districts.values().map(|d| d.block_count()).sum()
    }

    /// District whose outline contains `p`.
    pub fn district_at(&self, p: Point) -> Option<&District> {
        self.districts.values().find(|d| d.contains(p))
    }

    /// Every edge with its owner, city edges first.
    pub fn edges(&self) -> impl Iterator<Item = (RegionKey, &Edge)> {
        let major = self
            .region
            .tracer()
            .edges()
            .map(|e| (RegionKey::City, e));
        let local = self.districts.values().flat_map(|d| {
            let key = d.region().key();
            d.region().tracer().edges().map(move |e| (key, e))
        });
        major.chain(local)
    }

    pub fn edge_count(&self) -> usize {
        self.region.tracer().edge_count()
            + self
                .districts
                .values()
                .map(|d| d.region().tracer().edge_count())
                .sum::<usize>()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Suppresses per-step edge and seed events. District and block
    /// events are still recorded.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.region.set_muted(muted);
        for district in self.districts.values_mut() {
            district.region_mut().set_muted(muted);
        }
    }

    pub fn take_events(&mut self) -> Vec<CityEvent> {
        self.collect();
        std::mem::take(&mut self.events)
    }

    fn collect(&mut self) {
        for event in self.region.take_events() {
            self.events.push(CityEvent::Region {
                owner: RegionKey::City,
                event,
            });
        }
        for district in self.districts.values_mut() {
            let owner = district.region().key();
            for event in district.region_mut().take_events() {
                self.events.push(CityEvent::Region { owner, event });
            }
        }
    }

    fn push(&mut self, event: CityEvent) {
        self.collect();
        self.events.push(event);
    }

    // -----------------------------------------------------------------------
    // Tracing
    // -----------------------------------------------------------------------

    /// Queues the seed markers and traces the domain bounds and the
    /// boundary raster's region borders.
    pub fn trace_init(&mut self) {
        for p in self.seed_markers.clone() {
            self.region.add_seed(p);
        }
        self.region.trace_domain_bounds();
        if let Some(map) = &self.boundary_map {
            self.region.trace_boundaries(map);
        }
        self.initialized = true;
        self.collect();
    }

    /// Advances generation by one step. Returns `false` once everything
    /// is traced and subdivided.
    pub fn trace_step(&mut self, field: &dyn TensorField) -> bool {
        match self.phase {
            CityPhase::MajorRoads => {
                if !self.initialized {
                    self.trace_init();
                }
                if !self.region.trace_field(field) {
                    self.region.simplify_graph();
                    self.create_districts();
                    self.enter(CityPhase::Districts);
                }
            }
            CityPhase::Districts => self.step_districts(field),
            CityPhase::Blocks => {
                self.find_blocks();
                self.enter(CityPhase::Done);
            }
            CityPhase::Done => {}
        }
        self.collect();
        self.phase != CityPhase::Done
    }

    fn step_districts(&mut self, field: &dyn TensorField) {
        let Some(id) = self.trace_queue.pop_front() else {
            self.enter(CityPhase::Blocks);
            return;
        };
        let Some(district) = self.districts.get_mut(&id) else {
            return;
        };
        if district.trace_step(field) {
            self.trace_queue.push_back(id);
        } else {
            trace!("{id:?} finished tracing");
            self.block_queue.push_back(id);
        }
    }

    fn enter(&mut self, phase: CityPhase) {
        info!("city phase {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }

    /// Subdivides on demand: creates districts from the major network if
    /// there are none yet, otherwise detects blocks in every district that
    /// finished tracing. Returns the number of districts or blocks created.
    pub fn find_subregions(&mut self) -> usize {
        if self.districts.is_empty() {
            let created = self.create_districts();
            if self.phase == CityPhase::MajorRoads && created > 0 {
                self.enter(CityPhase::Districts);
            }
            created
        } else {
            let created = self.find_blocks();
            if self.phase == CityPhase::Blocks
                || (self.phase == CityPhase::Districts && self.trace_queue.is_empty())
            {
                self.enter(CityPhase::Done);
            }
            created
        }
    }

    fn create_districts(&mut self) -> usize {
        let subregions = self.region.find_subregions();
        let count = subregions.len();
        for subregion in subregions {
            let id = DistrictId(self.next_district_id);
            self.next_district_id += 1;
            let mut district = District::new(id, subregion.border, self.local_params);
            let region = district.region_mut();
            region.set_muted(self.muted);
            region.set_population_map(self.population_map.clone());
            region.set_seed_boundaries(self.boundary_map.as_ref());
            region.set_singularities(self.region.seeder().singularities().iter().copied());
            self.districts.insert(id, district);
            self.trace_queue.push_back(id);
            self.push(CityEvent::DistrictAdded(id));
        }
        info!("{count} districts from {} major edges", self.region.tracer().edge_count());
        count
    }

    fn find_blocks(&mut self) -> usize {
        let mut created = 0;
        while let Some(id) = self.block_queue.pop_front() {
            let Some(district) = self.districts.get_mut(&id) else {
                continue;
            };
            let removed = district.clear_blocks();
            let added = district.find_blocks();
            created += added.len();
            for block in removed {
                self.push(CityEvent::BlockRemoved { district: id, block });
            }
            for block in added {
                self.push(CityEvent::BlockAdded { district: id, block });
            }
        }
        info!("{created} blocks detected");
        created
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    pub fn add_seed(&mut self, p: Point) -> bool {
        let added = self.region.add_seed(p);
        self.collect();
        added
    }

    pub fn remove_seed(&mut self, p: Point) -> bool {
        let removed = self.region.remove_seed(p);
        self.collect();
        removed
    }

    /// Seed markers survive [`City::clear`] and are queued by
    /// [`City::trace_init`].
    pub fn add_seed_marker(&mut self, p: Point) {
        if !self.seed_markers.contains(&p) {
            self.seed_markers.push(p);
        }
    }

    pub fn remove_seed_marker(&mut self, p: Point) -> bool {
        let before = self.seed_markers.len();
        self.seed_markers.retain(|m| *m != p);
        self.seed_markers.len() != before
    }

    pub fn seed_markers(&self) -> &[Point] {
        &self.seed_markers
    }

    /// Straight major road from `from` to `to`.
    pub fn trace_line_segment(&mut self, from: Point, to: Point) -> bool {
        let changed = self.region.trace_line_segment(from, to);
        self.collect();
        changed
    }

    pub fn remove_edge(&mut self, owner: RegionKey, id: EdgeId) -> Result<Edge, GenerationError> {
        let edge = match owner {
            RegionKey::City => self.region.remove_edge(id)?,
            RegionKey::District(d) => self
                .districts
                .get_mut(&d)
                .ok_or(GenerationError::DistrictNotFound(d))?
                .region_mut()
                .remove_edge(id)?,
        };
        self.collect();
        Ok(edge)
    }

    pub fn remove_district(&mut self, id: DistrictId) -> Result<(), GenerationError> {
        let mut district = self
            .districts
            .remove(&id)
            .ok_or(GenerationError::DistrictNotFound(id))?;
        self.trace_queue.retain(|d| *d != id);
        self.block_queue.retain(|d| *d != id);

        self.collect();
        let blocks = district.clear();
        for event in district.region_mut().take_events() {
            self.events.push(CityEvent::Region {
                owner: RegionKey::District(id),
                event,
            });
        }
        for block in blocks {
            self.events.push(CityEvent::BlockRemoved { district: id, block });
        }
        self.events.push(CityEvent::DistrictRemoved(id));
        Ok(())
    }

    pub fn remove_districts(&mut self) {
        let ids: Vec<DistrictId> = self.districts.keys().rev().copied().collect();
        for id in ids {
            if let Err(err) = self.remove_district(id) {
                warn!("{err}");
            }
        }
    }

    /// Drops districts, roads and seeds and restarts from the major
    /// network. Seed markers and raster inputs are kept.
    pub fn clear(&mut self) {
        self.remove_districts();
        self.region.clear();
        self.trace_queue.clear();
        self.block_queue.clear();
        self.phase = CityPhase::MajorRoads;
        self.initialized = false;
        self.collect();
    }

    /// [`City::clear`], then forgets seed markers and raster inputs too.
    pub fn reset(&mut self) {
        self.clear();
        self.seed_markers.clear();
        self.set_boundary_map(None);
        self.set_population_map(None);
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    pub fn set_population_map(&mut self, map: Option<PopulationMap>) {
        for district in self.districts.values_mut() {
            district.region_mut().set_population_map(map.clone());
        }
        self.region.set_population_map(map.clone());
        self.population_map = map;
    }

    pub fn set_boundary_map(&mut self, map: Option<BoundaryMap>) {
        self.region.set_seed_boundaries(map.as_ref());
        for district in self.districts.values_mut() {
            district.region_mut().set_seed_boundaries(map.as_ref());
        }
        self.boundary_map = map;
    }

    pub fn boundary_map(&self) -> Option<&BoundaryMap> {
        self.boundary_map.as_ref()
    }

    /// Replaces the singularity list of the city and every district.
    pub fn set_singularities(&mut self, points: Vec<Point>) {
        for district in self.districts.values_mut() {
            district.region_mut().set_singularities(points.iter().copied());
        }
        self.region.set_singularities(points);
    }

    pub fn params(&self, tier: RoadTier) -> &TracerParams {
        match tier {
            RoadTier::Major => self.region.tracer().params(),
            RoadTier::Local => &self.local_params,
        }
    }

    /// Live-reloads one tier: the city tracer for major roads, every
    /// district tracer for local ones.
    pub fn set_params(&mut self, tier: RoadTier, params: TracerParams) {
        match tier {
            RoadTier::Major => self.region.reconfigure(params),
            RoadTier::Local => {
                for district in self.districts.values_mut() {
                    district.region_mut().reconfigure(params);
                }
                self.local_params = params;
            }
        }
        debug!("{} tracer parameters reloaded", tier.name());
    }
}
