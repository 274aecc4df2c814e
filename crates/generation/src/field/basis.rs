use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::TensorField;
use crate::geometry::Point;
use crate::tensor::Tensor;

/// The six canonical first-order singularities of a 2-D tensor field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SingularityKind {
    Center,
    Wedge,
    Node,
    Trisector,
    Saddle,
    Focus,
}

impl SingularityKind {
    pub const ALL: [SingularityKind; 6] = [
        SingularityKind::Center,
        SingularityKind::Wedge,
        SingularityKind::Node,
        SingularityKind::Trisector,
        SingularityKind::Saddle,
        SingularityKind::Focus,
    ];

    /// Closed-form tensor for the unit offset `(x, y)` from the anchor.
    fn tensor(self, x: f32, y: f32) -> Tensor {
        let (x2, y2, xy) = (x * x, y * y, x * y);
        match self {
            SingularityKind::Center => Tensor::from_components(y2 - x2, -2.0 * xy),
            SingularityKind::Wedge => Tensor::from_components(x, y),
            SingularityKind::Node => Tensor::from_components(x2 - y2, 2.0 * xy),
            SingularityKind::Trisector => Tensor::from_components(x, -y),
            SingularityKind::Saddle => Tensor::from_components(x2 - y2, -2.0 * xy),
            SingularityKind::Focus => Tensor::from_components(y2 - x2, 2.0 * xy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BasisShape {
    /// Constant orientation everywhere.
    Regular { direction: Vec2 },
    Singular(SingularityKind),
}

/// A single analytic contribution to a tensor field, anchored at `anchor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisField {
    pub anchor: Point,
    pub scale: f32,
    pub shape: BasisShape,
}

impl BasisField {
    pub fn regular(anchor: Point, scale: f32, direction: Vec2) -> Self {
        Self {
            anchor,
            scale,
            shape: BasisShape::Regular { direction },
        }
    }

    pub fn singular(anchor: Point, scale: f32, kind: SingularityKind) -> Self {
        Self {
            anchor,
            scale,
            shape: BasisShape::Singular(kind),
        }
    }

    pub fn is_singularity(&self) -> bool {
        matches!(self.shape, BasisShape::Singular(_))
    }

    pub fn singularity(&self) -> Option<SingularityKind> {
        match self.shape {
            BasisShape::Singular(kind) => Some(kind),
            BasisShape::Regular { .. } => None,
        }
    }
}

impl TensorField for BasisField {
    fn evaluate(&self, p: Point) -> Tensor {
        match self.shape {
            BasisShape::Regular { direction } => {
                self.scale * Tensor::new(1.0, direction.y.atan2(direction.x))
            }
            BasisShape::Singular(kind) => {
                let d = (p - self.anchor).normalize_or_zero();
                if d == Vec2::ZERO {
                    return Tensor::ZERO;
                }
                self.scale * kind.tensor(d.x, d.y)
            }
        }
    }
}
