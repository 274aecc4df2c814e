use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Sub};

use bevy::math::Vec2;

/// A position in normalized field space `[0,1] x [0,1]`.
///
/// Points are compared by exact coordinate value and carry a total order
/// (x first, then y) so they can key ordered maps. Vertices in the road
/// graph are identified purely by their `Point`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Point(Vec2);

impl Point {
    /// Sentinel meaning "no point".
    pub const INFINITY: Self = Self(Vec2::INFINITY);
    pub const ORIGIN: Self = Self(Vec2::ZERO);

    pub fn new(x: f32, y: f32) -> Self {
        // Adding +0.0 folds -0.0 into +0.0 so equality and ordering agree.
        Self(Vec2::new(x + 0.0, y + 0.0))
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn distance(self, other: Point) -> f32 {
        self.0.distance(other.0)
    }

    pub fn distance_squared(self, other: Point) -> f32 {
        self.0.distance_squared(other.0)
    }

    /// Clamp both coordinates into the unit square.
    pub fn clamp_unit(self) -> Self {
        Self::from(self.0.clamp(Vec2::ZERO, Vec2::ONE))
    }

    pub fn lerp(self, other: Point, t: f32) -> Self {
        Self::from(self.0.lerp(other.0, t))
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        p.0
    }
}

impl Add<Vec2> for Point {
    type Output = Point;

    fn add(self, rhs: Vec2) -> Point {
        Point::from(self.0 + rhs)
    }
}

impl Sub for Point {
    type Output = Vec2;

    fn sub(self, rhs: Point) -> Vec2 {
        self.0 - rhs.0
    }
}

impl Sub<Vec2> for Point {
    type Output = Point;

    fn sub(self, rhs: Vec2) -> Point {
        Point::from(self.0 - rhs)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .x
            .total_cmp(&other.0.x)
            .then_with(|| self.0.y.total_cmp(&other.0.y))
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.x.to_bits().hash(state);
        self.0.y.to_bits().hash(state);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.0.x, self.0.y)
    }
}
