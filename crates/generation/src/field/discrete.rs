use super::TensorField;
use crate::geometry::{Matrix, Point};
use crate::tensor::Tensor;

/// A field baked onto a uniform `(dim+1) x (dim+1)` lattice over the unit
/// square and read back with bilinear interpolation.
///
/// Row `r` holds samples at `y = r / dim`, column `c` at `x = c / dim`.
#[derive(Debug, Clone)]
pub struct DiscreteField {
    dim: usize,
    lattice: Matrix<Tensor>,
}

impl DiscreteField {
    pub fn new(dim: usize) -> Self {
        assert!(dim > 0, "lattice dimension must be positive");
        Self {
            dim,
            lattice: Matrix::new(dim + 1, dim + 1, Tensor::ZERO),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Field-space position of lattice node `(row, col)`.
    pub fn lattice_point(&self, row: usize, col: usize) -> Point {
        let s = 1.0 / self.dim as f32;
        Point::new(col as f32 * s, row as f32 * s)
    }

    /// Re-samples every lattice node from `source`.
    pub fn load_values(&mut self, source: &dyn TensorField) {
        let n = self.dim + 1;
        for row in 0..n {
            for col in 0..n {
                let p = self.lattice_point(row, col);
                self.lattice.set(row, col, source.evaluate(p));
            }
        }
    }

    /// Resets every node to the zero tensor.
    pub fn clear(&mut self) {
        self.lattice.fill(Tensor::ZERO);
    }

    pub fn node(&self, row: usize, col: usize) -> Tensor {
        *self.lattice.get(row, col)
    }

    /// Lower lattice index and fractional offset along one axis.
    fn cell(&self, v: f32) -> (usize, f32) {
        let scaled = v.clamp(0.0, 1.0) * self.dim as f32;
        let i = (scaled.floor() as usize).min(self.dim - 1);
        (i, scaled - i as f32)
    }
}

impl TensorField for DiscreteField {
    fn evaluate(&self, p: Point) -> Tensor {
        let (c, tx) = self.cell(p.x());
        let (r, ty) = self.cell(p.y());

        let t00 = self.node(r, c);
        let t01 = self.node(r, c + 1);
        let t10 = self.node(r + 1, c);
        let t11 = self.node(r + 1, c + 1);

        let bottom = (1.0 - tx) * t00 + tx * t01;
        let top = (1.0 - tx) * t10 + tx * t11;
        (1.0 - ty) * bottom + ty * top
    }
}
