use bevy::math::Vec2;

use super::{Point, Rect};

/// A simple closed polygon with counter-clockwise winding. The closing edge
/// from the last point back to the first is implicit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Builds a polygon, reversing the point order if it winds clockwise.
    pub fn new(mut points: Vec<Point>) -> Self {
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area; always non-negative.
    pub fn area(&self) -> f32 {
        signed_area(&self.points).abs()
    }

    /// Area-weighted centroid. Degenerate (zero-area) polygons fall back to
    /// the mean of their points.
    pub fn centroid(&self) -> Point {
        if self.points.is_empty() {
            return Point::INFINITY;
        }
        let a = signed_area(&self.points);
        if a.abs() <= f32::EPSILON {
            let sum: Vec2 = self.points.iter().map(|p| p.to_vec2()).sum();
            return Point::from(sum / self.points.len() as f32);
        }
        let mut c = Vec2::ZERO;
        for (p0, p1) in self.edges() {
            let cross = p0.x() * p1.y() - p1.x() * p0.y();
            c += (p0.to_vec2() + p1.to_vec2()) * cross;
        }
        Point::from(c / (6.0 * a))
    }

    /// Even-odd containment test.
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y() > p.y()) != (b.y() > p.y()) {
                let x = (b.x() - a.x()) * (p.y() - a.y()) / (b.y() - a.y()) + a.x();
                if p.x() < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Copy of the polygon scaled by `factor` about its centroid.
    pub fn scaled(&self, factor: f32) -> Polygon {
        let c = self.centroid();
        let points = self
            .points
            .iter()
            .map(|&p| c + (p - c) * factor)
            .collect();
        Polygon { points }
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter().copied())
    }

    /// Consecutive point pairs including the closing pair.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

fn signed_area(points: &[Point]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x() * b.y() - b.x() * a.y()
        })
        .sum();
    twice * 0.5
}
