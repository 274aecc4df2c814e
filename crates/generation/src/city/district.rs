use std::collections::BTreeMap;

use bevy::prelude::*;

use super::block::{Block, BlockId};
use super::DistrictId;
use crate::events::RegionKey;
use crate::field::{PolygonMask, TensorField};
use crate::geometry::{Point, Polygon};
use crate::region::Region;
use crate::tracer::{RoadTier, TracerParams};

/// A face of the major road network, filled with local roads and split
/// into blocks.
pub struct District {
    id: DistrictId,
    polygon: Polygon,
    region: Region,
    blocks: BTreeMap<BlockId, Block>,
    next_block_id: u32,
}

impl District {
    pub fn new(id: DistrictId, polygon: Polygon, params: TracerParams) -> Self {
        Self {
            id,
            polygon,
            region: Region::new(RegionKey::District(id), RoadTier::Local, params),
            blocks: BTreeMap::new(),
            next_block_id: 0,
        }
    }

    pub fn id(&self) -> DistrictId {
        self.id
    }

    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub(crate) fn region_mut(&mut self) -> &mut Region {
        &mut self.region
    }

    /// Even-odd containment against the district outline.
    pub fn contains(&self, p: Point) -> bool {
        self.polygon.contains(p)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().map(|(&id, b)| (id, b))
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Seeds the centroid and traces the outline as one closed boundary
    /// edge.
    pub fn trace_init(&mut self) {
        self.region.add_seed(self.polygon.centroid());
        let mut ring = self.polygon.points().to_vec();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        self.region.trace_boundary(&ring);
    }

    /// One local tracing step over `field` restricted to the outline.
    /// Simplifies the network once tracing runs out.
    pub fn trace_step(&mut self, field: &dyn TensorField) -> bool {
        if self.region.is_empty() {
            self.trace_init();
        }
        let mask = PolygonMask::new(field, &self.polygon);
        let more = self.region.trace_field(&mask);
        if !more {
            self.region.simplify_graph();
        }
        more
    }

    /// Replaces the blocks with the road-bounded faces of the local
    /// network. Returns the ids added.
    pub fn find_blocks(&mut self) -> Vec<BlockId> {
        let mut added = Vec::new();
        for subregion in self.region.find_subregions() {
            let id = BlockId(self.next_block_id);
            self.next_block_id += 1;
            self.blocks
                .insert(id, Block::new(&subregion.base, subregion.border));
            added.push(id);
        }
        debug!("{:?}: {} blocks", self.id, added.len());
        added
    }

    /// Drops every block and returns their ids.
    pub fn clear_blocks(&mut self) -> Vec<BlockId> {
        std::mem::take(&mut self.blocks).into_keys().collect()
    }

    /// Drops blocks, seeds and roads.
    pub fn clear(&mut self) -> Vec<BlockId> {
        let removed = self.clear_blocks();
        self.region.clear();
        removed
    }
}
