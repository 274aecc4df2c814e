use bevy::math::Vec2;

use crate::config::{INSTEP_MAX, RK4_STEP};
use crate::field::TensorField;
use crate::geometry::{orient, snap_zero, Point, Rect};

/// Advances `p` along the major or minor eigenvector of `field` until the
/// covered arc length reaches `dist_max`.
///
/// `d` carries the heading between calls: each Runge-Kutta stage is flipped
/// to agree with it, and it is replaced by the last accepted step. Stops
/// early on a vanishing step or when the next point would leave the unit
/// square. Returns the arc length actually covered.
pub fn integrate(
    field: &dyn TensorField,
    major: bool,
    p: &mut Point,
    d: &mut Vec2,
    dist_max: f32,
) -> f32 {
    let h = RK4_STEP;
    let mut dist = 0.0;

    for _ in 0..INSTEP_MAX {
        let at = |q: Point| orient(field.evaluate(q).eigenvector(major), *d);

        let m1 = at(*p);
        let m2 = at(*p + m1 * (h / 2.0));
        let m3 = at(*p + m2 * (h / 2.0));
        let m4 = at(*p + m3 * h);
        let dp = (m1 + 2.0 * m2 + 2.0 * m3 + m4) * (h / 6.0);

        let step = snap_zero(dp.length());
        if step == 0.0 {
            break;
        }
        let next = *p + dp;
        if dist + step > dist_max || !Rect::UNIT.contains(next) {
            break;
        }
        *p = next;
        *d = dp;
        dist += step;
    }
    dist
}
