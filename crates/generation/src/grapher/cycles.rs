use std::collections::{BTreeMap, HashMap, HashSet};

use bevy::prelude::*;

use super::Grapher;
use crate::geometry::{BitMatrix, Matrix, Point, Polygon};

const UNREACHABLE: u32 = u32::MAX;

/// All-pairs shortest paths over an unweighted graph, with next-hop
/// reconstruction.
struct ShortestPaths {
    next: Matrix<Option<usize>>,
}

impl ShortestPaths {
    fn floyd_warshall(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut dist = Matrix::new(n, n, UNREACHABLE);
        let mut next = Matrix::new(n, n, None);
        for i in 0..n {
            dist.set(i, i, 0);
            next.set(i, i, Some(i));
        }
        for &(a, b) in edges {
            dist.set(a, b, 1);
            dist.set(b, a, 1);
            next.set(a, b, Some(b));
            next.set(b, a, Some(a));
        }

        for k in 0..n {
            for i in 0..n {
                let ik = *dist.get(i, k);
                if ik == UNREACHABLE {
                    continue;
                }
                for j in 0..n {
                    let kj = *dist.get(k, j);
                    if kj == UNREACHABLE {
                        continue;
                    }
                    if ik + kj < *dist.get(i, j) {
                        dist.set(i, j, ik + kj);
                        let hop = *next.get(i, k);
                        next.set(i, j, hop);
                    }
                }
            }
        }
        Self { next }
    }

    /// Vertices from `from` to `to`, both included.
    fn path(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        if self.next.get(from, to).is_none() {
            return None;
        }
        let mut path = vec![from];
        let mut at = from;
        while at != to {
            at = (*self.next.get(at, to))?;
            path.push(at);
        }
        Some(path)
    }
}

impl Grapher {
    /// Minimum cycle basis of the graph, weighted by enclosed area.
    ///
    /// Candidates are Horton cycles: for every vertex `v` and edge `(x, y)`,
    /// the shortest path `x -> v` followed by `v -> y`, closed by the edge,
    /// whenever the two paths share only `v`. Paths are read off one
    /// shortest-path tree per `v`, so the choice among equal-length paths
    /// is consistent. Candidates are ranked by
    /// polygon area and an independent set is picked over GF(2), yielding
    /// `|E| - |V| + components` cycles in ascending area order.
    pub fn cycles(&self) -> Vec<Vec<Point>> {
        let vertices: Vec<Point> = self.vertices().collect();
        let index: BTreeMap<Point, usize> =
            vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let edges: Vec<(usize, usize)> = self
            .edges()
            .into_iter()
            .filter_map(|(a, b)| Some((*index.get(&a)?, *index.get(&b)?)))
            .collect();
        let edge_index: HashMap<(usize, usize), usize> = edges
            .iter()
            .enumerate()
            .map(|(i, &(a, b))| ((a.min(b), a.max(b)), i))
            .collect();

        let n = vertices.len();
        let m = edges.len();
        let wanted = (m + self.component_count()).saturating_sub(n);
        if wanted == 0 {
            return Vec::new();
        }

        let paths = ShortestPaths::floyd_warshall(n, &edges);
        let incidence = |cycle: &[usize]| -> Option<Vec<u64>> {
            let mut bits = vec![0u64; BitMatrix::words_for(m)];
            for (i, &a) in cycle.iter().enumerate() {
                let b = cycle[(i + 1) % cycle.len()];
                let e = *edge_index.get(&(a.min(b), a.max(b)))?;
                bits[e / 64] |= 1 << (e % 64);
            }
            Some(bits)
        };

        // Horton candidates, de-duplicated by edge set.
        let mut seen: HashSet<Vec<u64>> = HashSet::new();
        let mut candidates: Vec<(Vec<usize>, Vec<u64>, f32)> = Vec::new();
        let area = |cycle: &[usize]| Polygon::new(cycle.iter().map(|&i| vertices[i]).collect()).area();
        for v in 0..n {
            for &(x, y) in &edges {
                if v == x || v == y {
                    continue;
                }
                // Both halves follow the shortest-path tree towards `v`.
                let (Some(mut to_v), Some(mut from_v)) = (paths.path(x, v), paths.path(y, v))
                else {
                    continue;
                };
                to_v.pop();
                from_v.reverse();
                if to_v.iter().any(|u| from_v.contains(u)) {
                    continue;
                }
                to_v.extend(from_v);
                let Some(bits) = incidence(&to_v) else {
                    continue;
                };
                if seen.insert(bits.clone()) {
                    let a = area(&to_v);
                    candidates.push((to_v, bits, a));
                }
            }
        }

        candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

        let horton = BitMatrix::from_rows(m, candidates.iter().map(|(_, bits, _)| bits.clone()));
        let mut support = BitMatrix::identity(m);
        let mut selected: Vec<usize> = Vec::with_capacity(wanted);

        for i in 0..m {
            if selected.len() == wanted {
                break;
            }
            let Some(ci) = (0..horton.rows()).find(|&r| horton.dot(r, &support, i)) else {
                continue;
            };
            selected.push(ci);
            for j in i + 1..m {
                if support.dot(j, &horton, ci) {
                    support.xor_row(j, i);
                }
            }
        }

        if selected.len() < wanted {
            warn!(
                "cycle basis incomplete: {} of {wanted} cycles from {} candidates",
                selected.len(),
                candidates.len()
            );
        }
        debug!(
            "{n} vertices, {m} edges: {} cycles from {} candidates",
            selected.len(),
            candidates.len()
        );

        selected.sort_unstable();
        selected
            .into_iter()
            .map(|ci| candidates[ci].0.iter().map(|&i| vertices[i]).collect())
            .collect()
    }
}
