use super::{BasisField, TensorField};
use crate::config::{DEFAULT_BASIS_DECAY, MIN_BASIS_DISTANCE};
use crate::geometry::{rbf, Point};
use crate::tensor::Tensor;

/// Handle to an element inserted into a [`BasisSumField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BasisFieldId(pub u32);

/// Radial-basis blend of owned [`BasisField`] elements.
///
/// At a point `p` every element gets a nearness weight proportional to the
/// inverse square of its distance (normalized to sum to one), attenuated by
/// `exp(-decay * d^2)`. Close elements dominate, distant ones still
/// contribute a little everywhere.
#[derive(Debug, Clone)]
pub struct BasisSumField {
    elements: Vec<(BasisFieldId, BasisField)>,
    next_id: u32,
    decay: f32,
}

impl Default for BasisSumField {
    fn default() -> Self {
        Self::new(DEFAULT_BASIS_DECAY)
    }
}

impl BasisSumField {
    pub fn new(decay: f32) -> Self {
        Self {
            elements: Vec::new(),
            next_id: 0,
            decay,
        }
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn set_decay(&mut self, decay: f32) {
        self.decay = decay;
    }

    pub fn insert(&mut self, field: BasisField) -> BasisFieldId {
        let id = BasisFieldId(self.next_id);
        self.next_id += 1;
        self.elements.push((id, field));
        id
    }

    /// Removes and returns an element; `None` if the handle is stale.
    pub fn remove(&mut self, id: BasisFieldId) -> Option<BasisField> {
        let idx = self.elements.iter().position(|(eid, _)| *eid == id)?;
        Some(self.elements.remove(idx).1)
    }

    /// Swaps in a new definition for an existing element, returning the old one.
    pub fn replace(&mut self, id: BasisFieldId, field: BasisField) -> Option<BasisField> {
        let slot = self.elements.iter_mut().find(|(eid, _)| *eid == id)?;
        Some(std::mem::replace(&mut slot.1, field))
    }

    pub fn get(&self, id: BasisFieldId) -> Option<&BasisField> {
        self.elements
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, field)| field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BasisFieldId, &BasisField)> {
        self.elements.iter().map(|(id, field)| (*id, field))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Anchors of every singular element.
    pub fn singularities(&self) -> impl Iterator<Item = Point> + '_ {
        self.elements
            .iter()
            .filter(|(_, field)| field.is_singularity())
            .map(|(_, field)| field.anchor)
    }
}

impl TensorField for BasisSumField {
    fn evaluate(&self, p: Point) -> Tensor {
        if self.elements.is_empty() {
            return Tensor::ZERO;
        }

        let dists: Vec<f32> = self
            .elements
            .iter()
            .map(|(_, field)| p.distance(field.anchor).max(MIN_BASIS_DISTANCE))
            .collect();
        let total: f32 = dists.iter().sum();
        let nearness: Vec<f32> = dists.iter().map(|d| (total / d).powi(2)).collect();
        let nearness_total: f32 = nearness.iter().sum();

        self.elements
            .iter()
            .zip(&nearness)
            .map(|((_, field), near)| {
                let w = near / nearness_total;
                w * rbf(p, field.anchor, self.decay) * field.scale * field.evaluate(p)
            })
            .sum()
    }
}
