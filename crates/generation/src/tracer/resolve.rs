use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

use bevy::prelude::*;

use super::{integrate, SamplePoint, Tracer};
use crate::config::BOUNDARY_SNAP_FACTOR;
use crate::edge::{ChangeSet, EdgeKind};
use crate::field::TensorField;
use crate::geometry::{angle_between, snap_zero, Point};
use crate::raster::{border, BoundaryMap};

/// Closest approach to an existing edge seen while tracing.
#[derive(Debug, Clone, Copy)]
struct Touch {
    sample: SamplePoint,
    /// Index of the new trace sample that made the approach.
    at: usize,
    distance: f32,
}

/// Samples and junction candidates gathered during one trace.
struct Probe {
    start: Point,
    trace: Vec<Point>,
    vertex: Option<Point>,
    touch: Option<Touch>,
}

impl Probe {
    fn new(start: Point) -> Self {
        Self {
            start,
            trace: Vec::new(),
            vertex: None,
            touch: None,
        }
    }
}

impl Tracer {
    // -----------------------------------------------------------------------
    // Tracing entry points
    // -----------------------------------------------------------------------

    /// Traces one streamline of `field` from `from` and resolves it against
    /// the network.
    ///
    /// The start snaps to an existing vertex within `dist_sep`. The trace
    /// ends on an existing vertex, splits an existing edge it runs into, or
    /// ends freely after about one segment length.
    pub fn trace_field(
        &mut self,
        field: &dyn TensorField,
        major: bool,
        from: Point,
        direction: Vec2,
    ) -> ChangeSet {
        let start = self
            .nearest_vertex(from, self.params.dist_sep)
            .unwrap_or(from);
        let mut probe = Probe::new(start);
        let mut p = start;
        let mut d = direction;
        let mut seg_len = 0.0;

        while seg_len < self.dist_segment(p) + self.dist_lookahead(p) {
            let step = integrate(field, major, &mut p, &mut d, self.params.dist_sample);
            if snap_zero(step) == 0.0 {
                break;
            }
            seg_len += step;
            probe.trace.push(p);

            let heading = d.normalize_or_zero();
            self.probe_vertex(&mut probe, p, heading);

            let nearest = self
                .samples
                .find(p, heading * self.dist_test(p), FRAC_PI_3)
                .into_iter()
                .next();
            if let Some(sample) = nearest {
                let distance = p.distance(sample.point);
                let better = match probe.touch {
                    Some(t) => distance < t.distance && sample.edge == t.sample.edge,
                    None => seg_len <= self.dist_segment(p),
                };
                if better {
                    probe.touch = Some(Touch {
                        sample,
                        at: probe.trace.len() - 1,
                        distance,
                    });
                }
                if distance < self.dist_touch() {
                    break;
                }
            }
        }

        trace!(
            "{} trace from {start}: {} samples, vertex {:?}, touch {:?}",
            self.tier.name(),
            probe.trace.len(),
            probe.vertex,
            probe.touch.map(|t| t.sample.point)
        );

        let kind = self.road_kind();
        match (probe.vertex, probe.touch) {
            (Some(v), _) => self.complete_at_vertex(start, probe.trace, v, kind),
            (None, Some(touch)) => self.complete_at_touch(start, probe.trace, touch, kind),
            (None, None) => self.complete_free(start, probe.trace, kind),
        }
    }

    /// Traces a straight road of this tracer's tier from `from` to `to`.
    pub fn trace_line_segment(&mut self, from: Point, to: Point) -> ChangeSet {
        let kind = self.road_kind();
        self.trace_line(from, to, kind)
    }

    /// Traces the four sides of the unit square as boundary edges.
    pub fn trace_domain_bounds(&mut self) -> ChangeSet {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut changes = ChangeSet::new();
        for i in 0..corners.len() {
            let (a, b) = (corners[i], corners[(i + 1) % corners.len()]);
            changes.extend(self.trace_line(a, b, EdgeKind::Boundary));
        }
        changes
    }

    /// Adds a boundary edge along `points`. Each end snaps onto a nearby
    /// sample of an existing edge, splitting that edge. A ring whose last
    /// point repeats the first becomes a loop edge.
    pub fn trace_boundary(&mut self, points: &[Point]) -> ChangeSet {
        let mut changes = ChangeSet::new();
        let Some(&first) = points.first() else {
            return changes;
        };
        let Some((&last, interior)) = points[1..].split_last() else {
            return changes;
        };
        let snap = BOUNDARY_SNAP_FACTOR * self.dist_touch();
        let v1 = self.snap_to_sample(first, snap, &mut changes);

        // Thinned interior; the last point is always kept so closed rings
        // stay closed.
        let step = self.params.dist_sample;
        let mut trace = Vec::new();
        let mut a = v1;
        for &b in interior {
            if a.distance(b) > step && b.distance(last) > step {
                trace.push(b);
                a = b;
            }
        }
        let v2 = if last == first {
            v1
        } else {
            self.snap_to_sample(last, snap, &mut changes)
        };

        let edge = self.add_edge(v1, v2, trace, EdgeKind::Boundary);
        changes.push_added(edge);
        changes
    }

    /// Traces the border of every labelled region in `map`.
    pub fn trace_boundaries(&mut self, map: &BoundaryMap) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for (label, chains) in border::find_regions(map) {
            debug!("tracing {} border chains of region {label}", chains.len());
            for chain in chains {
                let points: Vec<Point> = chain
                    .iter()
                    .map(|&(col, row)| map.to_field_coords(col as f32, row as f32))
                    .collect();
                changes.extend(self.trace_boundary(&points));
            }
        }
        changes
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn trace_line(&mut self, from: Point, to: Point, kind: EdgeKind) -> ChangeSet {
        let start = self
            .nearest_vertex(from, self.params.dist_sep)
            .unwrap_or(from);
        let line = to - start;
        let length = line.length();
        if snap_zero(length) == 0.0 {
            return ChangeSet::new();
        }
        let heading = line / length;
        let step = self.params.dist_sample;
        let dist_touch = self.dist_touch();

        let mut probe = Probe::new(start);
        let mut p = start;
        let mut seg_len = 0.0;
        while seg_len < length {
            p = p + heading * step;
            seg_len += step;
            probe.trace.push(p);

            self.probe_vertex(&mut probe, p, heading);

            let nearest = self
                .samples
                .find(p, heading * dist_touch, FRAC_PI_3)
                .into_iter()
                .next();
            if let Some(sample) = nearest {
                let distance = p.distance(sample.point);
                if probe.touch.map_or(true, |t| distance < t.distance) {
                    probe.touch = Some(Touch {
                        sample,
                        at: probe.trace.len() - 1,
                        distance,
                    });
                }
                if distance < dist_touch {
                    break;
                }
            }
        }

        match (probe.vertex, probe.touch) {
            (Some(v), _) => self.complete_at_vertex(start, probe.trace, v, kind),
            (None, Some(touch)) => self.complete_at_touch(start, probe.trace, touch, kind),
            (None, None) => self.complete_at_vertex(start, probe.trace, to, kind),
        }
    }

    /// Records the first vertex ahead of `p` within connect range.
    fn probe_vertex(&self, probe: &mut Probe, p: Point, heading: Vec2) {
        if probe.vertex.is_some() {
            return;
        }
        probe.vertex = self
            .vertices
            .find(p, heading * self.dist_connect(), FRAC_PI_2)
            .into_iter()
            .find(|v| *v != probe.start);
    }

    fn snap_to_sample(&mut self, p: Point, radius: f32, changes: &mut ChangeSet) -> Point {
        let Some(sample) = self.samples.nearest(p, radius) else {
            return p;
        };
        let split = self.split_edge(sample.edge, sample.point);
        if split.is_empty() {
            return p;
        }
        changes.extend(split);
        sample.point
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Ends the trace on an existing vertex, keeping the samples up to the
    /// closest approach.
    fn complete_at_vertex(
        &mut self,
        start: Point,
        mut trace: Vec<Point>,
        end: Point,
        kind: EdgeKind,
    ) -> ChangeSet {
        let mut changes = ChangeSet::new();
        if start == end || self.contains_edge(start, end) {
            return changes;
        }

        let mut last = f32::INFINITY;
        let mut keep = 0;
        for q in &trace {
            let d = q.distance(end);
            if d > last {
                break;
            }
            last = d;
            keep += 1;
        }
        if keep == 0 {
            return changes;
        }
        trace.truncate(keep);
        if trace.last() == Some(&end) {
            trace.pop();
        }

        let edge = self.add_edge(start, end, trace, kind);
        changes.push_added(edge);
        changes
    }

    /// Ends the trace on a new junction that splits the touched edge.
    fn complete_at_touch(
        &mut self,
        start: Point,
        mut trace: Vec<Point>,
        touch: Touch,
        kind: EdgeKind,
    ) -> ChangeSet {
        let empty = ChangeSet::new();
        if touch.distance > self.dist_touch() {
            return empty;
        }

        let junction = touch.sample.point;
        let Some(touched) = self.edge(touch.sample.edge) else {
            return empty;
        };
        // A loop has no chord, so it is measured against its local tangent.
        let reference = if touched.is_loop() {
            touched.tangent_at(junction)
        } else {
            Some(touched.v1() - touched.v2())
        };
        let Some(reference) = reference else {
            return empty;
        };
        // Hits within 45 degrees of the touched edge's chord are dropped.
        let approach = trace[touch.at] - start;
        let angle = angle_between(approach, reference);
        if angle < FRAC_PI_4 || angle > PI - FRAC_PI_4 {
            return empty;
        }

        if self
            .nearest_vertex(junction, 0.5 * self.dist_test(junction))
            .is_some()
        {
            return empty;
        }

        trace.truncate(touch.at);
        if trace.is_empty() {
            return empty;
        }

        let mut changes = self.split_edge(touch.sample.edge, junction);
        if changes.is_empty() {
            return changes;
        }
        let edge = self.add_edge(start, junction, trace, kind);
        changes.push_added(edge);
        changes
    }

    /// Ends the trace in open space after at most one segment length.
    fn complete_free(&mut self, start: Point, trace: Vec<Point>, kind: EdgeKind) -> ChangeSet {
        let mut changes = ChangeSet::new();

        let mut kept = Vec::new();
        let mut length = 0.0;
        let mut prev = start;
        for q in trace {
            let next = length + prev.distance(q);
            if next > self.dist_segment(q) {
                break;
            }
            length = next;
            kept.push(q);
            prev = q;
        }

        let Some(&last) = kept.last() else {
            return changes;
        };
        if length < self.dist_sep_at(last) {
            return changes;
        }
        kept.pop();

        let edge = self.add_edge(start, last, kept, kind);
        changes.push_added(edge);
        changes
    }
}
