//! Tensor fields: analytic basis elements, their radial-basis sum, baked
//! lattices, raster adapters and the blended city field.
//!
//! ## Design
//!
//! Every field implements [`TensorField`], a pure read-only evaluation at a
//! point. Tracing code takes `&dyn TensorField`, so any combination the host
//! builds can drive the tracer, and the borrow checker keeps field
//! evaluation and network mutation from overlapping.

mod adapters;
mod basis;
mod composite;
mod discrete;
mod sum;
#[cfg(test)]
mod tests;

pub use adapters::{BoundaryField, HeightField, PolygonMask};
pub use basis::{BasisField, BasisShape, SingularityKind};
pub use composite::{CityField, FieldLayer, FieldSettings};
pub use discrete::DiscreteField;
pub use sum::{BasisFieldId, BasisSumField};

use crate::geometry::Point;
use crate::tensor::Tensor;

/// A function from field-space position to tensor.
pub trait TensorField {
    fn evaluate(&self, p: Point) -> Tensor;
}

/// Adapts a closure into a field.
pub struct FnField<F>(pub F);

impl<F: Fn(Point) -> Tensor> TensorField for FnField<F> {
    fn evaluate(&self, p: Point) -> Tensor {
        (self.0)(p)
    }
}

/// The same tensor everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub Tensor);

impl TensorField for ConstantField {
    fn evaluate(&self, _p: Point) -> Tensor {
        self.0
    }
}
