//! Geometry primitives shared by the field, tracer and graph layers.
//!
//! Everything lives in normalized field space `[0,1] x [0,1]` with the origin
//! at the bottom-left corner.

mod bitmatrix;
mod matrix;
mod point;
mod polygon;
mod rect;

use bevy::math::Vec2;

pub use bitmatrix::BitMatrix;
pub use matrix::Matrix;
pub use point::Point;
pub use polygon::Polygon;
pub use rect::Rect;

/// Magnitudes below this are treated as exact zero.
pub const ZERO_EPSILON: f32 = 1e-5;

/// Snaps values within [`ZERO_EPSILON`] of zero to `0.0`.
#[inline]
pub fn snap_zero(a: f32) -> f32 {
    if a.abs() < ZERO_EPSILON {
        0.0
    } else {
        a
    }
}

/// Gaussian radial basis `exp(-decay * |x - c|^2)`.
pub fn rbf(x: Point, c: Point, decay: f32) -> f32 {
    snap_zero((-decay * x.distance_squared(c)).exp())
}

/// Unsigned angle between two vectors in `[0, pi]`. Zero vectors yield 0.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let a = a.normalize_or_zero();
    let b = b.normalize_or_zero();
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Flips `v` when it points against `reference`.
#[inline]
pub fn orient(v: Vec2, reference: Vec2) -> Vec2 {
    if v.dot(reference) < 0.0 {
        -v
    } else {
        v
    }
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
