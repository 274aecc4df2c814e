//! Compressed symmetric 2x2 tensors.
//!
//! A traceless symmetric tensor with magnitude `r` and orientation `theta` is
//! stored as the 2-vector `(r cos 2theta, r sin 2theta)`. Doubling the angle
//! makes `theta` and `theta + pi` the same tensor, which is exactly the sign
//! ambiguity of a road direction.

use std::f32::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use bevy::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tensor(Vec2);

impl Tensor {
    pub const ZERO: Tensor = Tensor(Vec2::ZERO);

    /// Tensor with magnitude `value` and orientation `angle` (radians).
    pub fn new(value: f32, angle: f32) -> Self {
        Self(Vec2::new(
            value * (2.0 * angle).cos(),
            value * (2.0 * angle).sin(),
        ))
    }

    /// Wraps raw `(r cos 2theta, r sin 2theta)` components.
    pub fn from_components(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn components(self) -> Vec2 {
        self.0
    }

    /// Magnitude `r`.
    pub fn value(self) -> f32 {
        self.0.length()
    }

    /// Orientation in `[0, pi)`.
    pub fn angle(self) -> f32 {
        let mut a = self.0.y.atan2(self.0.x);
        if a < 0.0 {
            a += TAU;
        }
        let half = a / 2.0;
        if half >= PI {
            0.0
        } else {
            half
        }
    }

    /// Major eigenvector (length `r`, along `angle`), or the minor one rotated
    /// by 90 degrees.
    pub fn eigenvector(self, major: bool) -> Vec2 {
        let r = self.value();
        let f = self.angle();
        let v = Vec2::new(r * f.cos(), r * f.sin());
        if major {
            v
        } else {
            Vec2::new(-v.y, v.x)
        }
    }

    /// Unit-magnitude copy; the zero tensor stays zero.
    pub fn normalized(self) -> Self {
        Self(self.0.normalize_or_zero())
    }

    pub fn is_zero(self) -> bool {
        self.0 == Vec2::ZERO
    }
}

impl Add for Tensor {
    type Output = Tensor;

    fn add(self, rhs: Tensor) -> Tensor {
        Tensor(self.0 + rhs.0)
    }
}

impl AddAssign for Tensor {
    fn add_assign(&mut self, rhs: Tensor) {
        self.0 += rhs.0;
    }
}

impl Sub for Tensor {
    type Output = Tensor;

    fn sub(self, rhs: Tensor) -> Tensor {
        Tensor(self.0 - rhs.0)
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor(-self.0)
    }
}

impl Mul<f32> for Tensor {
    type Output = Tensor;

    fn mul(self, s: f32) -> Tensor {
        Tensor(self.0 * s)
    }
}

impl Mul<Tensor> for f32 {
    type Output = Tensor;

    fn mul(self, t: Tensor) -> Tensor {
        Tensor(t.0 * self)
    }
}

impl Div<f32> for Tensor {
    type Output = Tensor;

    fn div(self, s: f32) -> Tensor {
        Tensor(self.0 / s)
    }
}

impl std::iter::Sum for Tensor {
    fn sum<I: Iterator<Item = Tensor>>(iter: I) -> Tensor {
        iter.fold(Tensor::ZERO, |acc, t| acc + t)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn angle_mod_pi_eq(a: f32, b: f32) -> bool {
        let d = (a - b).rem_euclid(PI);
        d < 1e-3 || PI - d < 1e-3
    }

    #[test]
    fn test_value_and_angle_roundtrip() {
        let mut rng = StdRng::seed_from_u64(0x7E45_0001);
        for _ in 0..2000 {
            let r = rng.gen_range(0.01f32..10.0);
            let theta = rng.gen_range(-2.0 * PI..2.0 * PI);
            let t = Tensor::new(r, theta);
            assert!((t.value() - r).abs() < 1e-3 * r.max(1.0), "r={r}");
            assert!(angle_mod_pi_eq(t.angle(), theta), "theta={theta}");
        }
    }

    #[test]
    fn test_eigenvectors_are_orthogonal_with_norm_r() {
        let mut rng = StdRng::seed_from_u64(0x7E45_0002);
        for _ in 0..2000 {
            let r = rng.gen_range(0.01f32..5.0);
            let t = Tensor::new(r, rng.gen_range(0.0..PI));
            let major = t.eigenvector(true);
            let minor = t.eigenvector(false);
            assert!((major.length() - r).abs() < 1e-3);
            assert!(major.dot(minor).abs() < 1e-3 * r * r.max(1.0));
        }
    }

    #[test]
    fn test_opposite_directions_are_the_same_tensor() {
        let a = Tensor::new(1.0, 0.3);
        let b = Tensor::new(1.0, 0.3 + PI);
        assert!((a.components() - b.components()).length() < 1e-5);
    }

    #[test]
    fn test_perpendicular_directions_cancel() {
        let sum = Tensor::new(1.0, 0.0) + Tensor::new(1.0, FRAC_PI_2);
        assert!(sum.value() < 1e-5);
    }

    #[test]
    fn test_angle_is_in_half_open_range() {
        let t = Tensor::new(1.0, -FRAC_PI_4);
        let a = t.angle();
        assert!((0.0..PI).contains(&a));
        assert!((a - 3.0 * FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_zero_tensor() {
        assert!(Tensor::ZERO.is_zero());
        assert_eq!(Tensor::ZERO.eigenvector(true), Vec2::ZERO);
        assert_eq!(Tensor::ZERO.normalized(), Tensor::ZERO);
        let sum: Tensor = [Tensor::new(1.0, 0.0), Tensor::new(2.0, 0.0)].into_iter().sum();
        assert!((sum.value() - 3.0).abs() < 1e-6);
    }
}
