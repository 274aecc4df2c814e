//! Road and boundary edges, and the change-sets that report their lifecycle.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Handle to an edge inside the tracer that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    MajorRoad,
    MinorRoad,
    Boundary,
    Bridge,
}

impl EdgeKind {
    pub fn is_road(self) -> bool {
        matches!(self, EdgeKind::MajorRoad | EdgeKind::MinorRoad)
    }
}

/// A logically undirected segment between two vertices. `trace` holds the
/// interior sample points from `v1` towards `v2`, endpoints excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    id: EdgeId,
    v1: Point,
    v2: Point,
    trace: Vec<Point>,
    kind: EdgeKind,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, v1: Point, v2: Point, trace: Vec<Point>, kind: EdgeKind) -> Self {
        Self {
            id,
            v1,
            v2,
            trace,
            kind,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn v1(&self) -> Point {
        self.v1
    }

    pub fn v2(&self) -> Point {
        self.v2
    }

    pub fn trace(&self) -> &[Point] {
        &self.trace
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn is_road(&self) -> bool {
        self.kind.is_road()
    }

    pub fn is_loop(&self) -> bool {
        self.v1 == self.v2
    }

    pub fn trace_reversed(&self) -> Vec<Point> {
        self.trace.iter().rev().copied().collect()
    }

    /// `v1`, the trace, then `v2`.
    pub fn polyline(&self) -> Vec<Point> {
        let mut out = Vec::with_capacity(self.trace.len() + 2);
        out.push(self.v1);
        out.extend_from_slice(&self.trace);
        out.push(self.v2);
        out
    }

    /// Arc length along the polyline.
    pub fn length(&self) -> f32 {
        self.polyline()
            .windows(2)
            .map(|w| w[0].distance(w[1]))
            .sum()
    }

    pub fn connects(&self, a: Point, b: Point, ignore_order: bool) -> bool {
        (self.v1 == a && self.v2 == b) || (ignore_order && self.v1 == b && self.v2 == a)
    }

    /// The endpoint opposite `v`, if `v` is an endpoint.
    pub fn opposite(&self, v: Point) -> Option<Point> {
        if self.v1 == v {
            Some(self.v2)
        } else if self.v2 == v {
            Some(self.v1)
        } else {
            None
        }
    }

    /// Direction of the edge around one of its trace samples, from the
    /// preceding point to the following one.
    pub fn tangent_at(&self, sample: Point) -> Option<bevy::math::Vec2> {
        let i = self.trace.iter().position(|p| *p == sample)?;
        let prev = if i == 0 { self.v1 } else { self.trace[i - 1] };
        let next = self.trace.get(i + 1).copied().unwrap_or(self.v2);
        Some(next - prev)
    }

    /// Geometry of the edge obtained by joining `self` and `other` through
    /// their shared vertex, which becomes an interior sample.
    ///
    /// `None` when the edges share no endpoint, differ in kind, or would
    /// close into a loop.
    pub fn join(&self, other: &Edge) -> Option<JoinedPath> {
        if self.kind != other.kind || self.id == other.id || self.is_loop() || other.is_loop() {
            return None;
        }
        let concat = |a: Vec<Point>, shared: Point, b: Vec<Point>| {
            let mut trace = a;
            trace.push(shared);
            trace.extend(b);
            trace
        };
        let (v1, v2, trace) = if self.v2 == other.v1 {
            (self.v1, other.v2, concat(self.trace.clone(), self.v2, other.trace.clone()))
        } else if self.v2 == other.v2 {
            (self.v1, other.v1, concat(self.trace.clone(), self.v2, other.trace_reversed()))
        } else if self.v1 == other.v1 {
            (self.v2, other.v2, concat(self.trace_reversed(), self.v1, other.trace.clone()))
        } else if self.v1 == other.v2 {
            (other.v1, self.v2, concat(other.trace.clone(), self.v1, self.trace.clone()))
        } else {
            return None;
        };
        if v1 == v2 {
            return None;
        }
        Some(JoinedPath {
            v1,
            v2,
            trace,
            kind: self.kind,
        })
    }
}

/// Result of [`Edge::join`], not yet owned by a tracer.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPath {
    pub v1: Point,
    pub v2: Point,
    pub trace: Vec<Point>,
    pub kind: EdgeKind,
}

// ---------------------------------------------------------------------------
// Change-sets
// ---------------------------------------------------------------------------

/// One entry of a [`ChangeSet`]. `Added` carries a snapshot of the edge as
/// created, `Removed` carries the edge itself after the tracer let go of it.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Added(Edge),
    Removed(Edge),
}

/// Ordered record of edge additions and removals produced by one tracer
/// operation. Replaying it in order keeps a graph mirror consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<EdgeChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_added(&mut self, edge: Edge) {
        self.changes.push(EdgeChange::Added(edge));
    }

    pub fn push_removed(&mut self, edge: Edge) {
        self.changes.push(EdgeChange::Removed(edge));
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EdgeChange> {
        self.changes.iter()
    }

    pub fn added(&self) -> impl Iterator<Item = &Edge> {
        self.changes.iter().filter_map(|c| match c {
            EdgeChange::Added(e) => Some(e),
            EdgeChange::Removed(_) => None,
        })
    }

    pub fn removed(&self) -> impl Iterator<Item = &Edge> {
        self.changes.iter().filter_map(|c| match c {
            EdgeChange::Removed(e) => Some(e),
            EdgeChange::Added(_) => None,
        })
    }
}

impl IntoIterator for ChangeSet {
    type Item = EdgeChange;
    type IntoIter = std::vec::IntoIter<EdgeChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn edge(id: u32, v1: Point, v2: Point, trace: Vec<Point>) -> Edge {
        Edge::new(EdgeId(id), v1, v2, trace, EdgeKind::MajorRoad)
    }

    #[test]
    fn test_join_head_to_tail() {
        let a = edge(0, p(0.0, 0.0), p(0.2, 0.0), vec![p(0.1, 0.0)]);
        let b = edge(1, p(0.2, 0.0), p(0.4, 0.0), vec![p(0.3, 0.0)]);
        let j = a.join(&b).expect("shared vertex");
        assert_eq!((j.v1, j.v2), (p(0.0, 0.0), p(0.4, 0.0)));
        assert_eq!(j.trace, vec![p(0.1, 0.0), p(0.2, 0.0), p(0.3, 0.0)]);
    }

    #[test]
    fn test_join_all_orientations_keep_geometry_continuous() {
        let a = edge(0, p(0.0, 0.0), p(0.2, 0.0), vec![p(0.1, 0.0)]);
        let b_fwd = edge(1, p(0.2, 0.0), p(0.4, 0.0), vec![p(0.3, 0.0)]);
        let b_rev = edge(2, p(0.4, 0.0), p(0.2, 0.0), vec![p(0.3, 0.0)]);
        let a_rev = edge(3, p(0.2, 0.0), p(0.0, 0.0), vec![p(0.1, 0.0)]);

        for (x, y) in [(&a, &b_fwd), (&a, &b_rev), (&a_rev, &b_fwd), (&b_fwd, &a), (&b_rev, &a_rev)] {
            let j = x.join(y).expect("shared vertex");
            let mut line = vec![j.v1];
            line.extend(j.trace.iter().copied());
            line.push(j.v2);
            let length: f32 = line.windows(2).map(|w| w[0].distance(w[1])).sum();
            assert!((length - 0.4).abs() < 1e-5, "{x:?} + {y:?}");
        }
    }

    #[test]
    fn test_join_rejects_mixed_kinds_and_loops() {
        let a = edge(0, p(0.0, 0.0), p(0.2, 0.0), vec![]);
        let boundary = Edge::new(EdgeId(1), p(0.2, 0.0), p(0.4, 0.0), vec![], EdgeKind::Boundary);
        assert!(a.join(&boundary).is_none());

        let parallel = edge(2, p(0.2, 0.0), p(0.0, 0.0), vec![p(0.1, 0.05)]);
        assert!(a.join(&parallel).is_none());

        let apart = edge(3, p(0.5, 0.5), p(0.6, 0.6), vec![]);
        assert!(a.join(&apart).is_none());
    }

    #[test]
    fn test_tangent_and_length() {
        let e = edge(0, p(0.0, 0.0), p(0.3, 0.0), vec![p(0.1, 0.0), p(0.2, 0.0)]);
        let t = e.tangent_at(p(0.1, 0.0)).expect("sample exists");
        assert!((t.x - 0.2).abs() < 1e-6 && t.y == 0.0);
        assert!(e.tangent_at(p(0.15, 0.0)).is_none());
        assert!((e.length() - 0.3).abs() < 1e-6);
        assert_eq!(e.opposite(p(0.3, 0.0)), Some(p(0.0, 0.0)));
        assert!(e.connects(p(0.3, 0.0), p(0.0, 0.0), true));
        assert!(!e.connects(p(0.3, 0.0), p(0.0, 0.0), false));
    }

    #[test]
    fn test_changeset_preserves_order() {
        let a = edge(0, p(0.0, 0.0), p(0.1, 0.0), vec![]);
        let b = edge(1, p(0.1, 0.0), p(0.2, 0.0), vec![]);
        let mut set = ChangeSet::new();
        set.push_added(a.clone());
        set.push_removed(b.clone());
        set.push_added(b.clone());
        assert_eq!(set.len(), 3);
        assert_eq!(set.added().count(), 2);
        assert_eq!(set.removed().next(), Some(&b));
        let kinds: Vec<bool> = set
            .into_iter()
            .map(|c| matches!(c, EdgeChange::Added(_)))
            .collect();
        assert_eq!(kinds, vec![true, false, true]);
    }
}
