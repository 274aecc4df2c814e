//! Border tracing for labelled raster regions.
//!
//! A pixel is a border pixel when fewer than eight of its neighbours carry
//! the same label. Border pixels are gathered in scan order into chains of
//! 8-connected pixels, and chains whose ends touch are merged as the scan
//! advances.

use std::collections::BTreeMap;

use super::BoundaryMap;

/// `(col, row)` pixel position.
pub type Pixel = (usize, usize);
/// Ordered run of 8-connected border pixels.
pub type BorderChain = Vec<Pixel>;
/// Border chains per region label.
pub type Regions = BTreeMap<u16, Vec<BorderChain>>;

fn label_at(map: &BoundaryMap, col: i64, row: i64) -> Option<u16> {
    if map.in_bounds(col, row) {
        *map.pixel(col as usize, row as usize)
    } else {
        None
    }
}

fn same_label_neighbours(map: &BoundaryMap, p: Pixel, label: u16) -> Vec<Pixel> {
    let mut out = Vec::with_capacity(8);
    for dx in -1i64..=1 {
        for dy in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (c, r) = (p.0 as i64 + dx, p.1 as i64 + dy);
            if label_at(map, c, r) == Some(label) {
                out.push((c as usize, r as usize));
            }
        }
    }
    out
}

/// True for 8-connected (or identical) pixels.
pub fn adjacent(a: Pixel, b: Pixel) -> bool {
    a.0.abs_diff(b.0) <= 1 && a.1.abs_diff(b.1) <= 1
}

fn is_edge_pixel(map: &BoundaryMap, p: Pixel) -> bool {
    p.0 == 0 || p.1 == 0 || p.0 == map.width() - 1 || p.1 == map.height() - 1
}

/// Extracts the border chains of every labelled region. Pixels on the
/// raster's outer frame are skipped since the domain bounds cover them.
pub fn find_regions(map: &BoundaryMap) -> Regions {
    let mut regions = Regions::new();

    for row in 0..map.height() {
        for col in 0..map.width() {
            let p = (col, row);
            let Some(label) = *map.pixel(col, row) else {
                continue;
            };
            if is_edge_pixel(map, p) {
                continue;
            }
            let neighbours = same_label_neighbours(map, p, label);
            if neighbours.len() >= 8 {
                continue;
            }

            let chains = regions.entry(label).or_default();
            let target = chains
                .iter_mut()
                .find(|chain| chain.last().is_some_and(|last| neighbours.contains(last)));
            match target {
                Some(chain) => chain.push(p),
                None => chains.push(vec![p]),
            }
        }

        for chains in regions.values_mut() {
            connect_chains(chains);
        }
    }

    regions
}

/// Merges chains whose end pixels are adjacent.
fn connect_chains(chains: &mut Vec<BorderChain>) {
    for chain in chains.iter_mut() {
        if let (Some(first), Some(last)) = (chain.first(), chain.last()) {
            if first.0 > last.0 {
                chain.reverse();
            }
        }
    }

    for i in 0..chains.len() {
        if chains[i].is_empty() {
            continue;
        }
        for j in (i + 1)..chains.len() {
            if chains[j].is_empty() || chains[i].is_empty() {
                continue;
            }
            let (a_first, a_last) = ends(&chains[i]);
            let (b_first, b_last) = ends(&chains[j]);

            if adjacent(a_last, b_first) {
                let tail = std::mem::take(&mut chains[j]);
                chains[i].extend(tail);
            } else if adjacent(a_first, b_last) {
                let tail = std::mem::take(&mut chains[i]);
                chains[j].extend(tail);
                break;
            } else if adjacent(a_first, b_first) {
                chains[i].reverse();
                let tail = std::mem::take(&mut chains[j]);
                chains[i].extend(tail);
            } else if adjacent(a_last, b_last) {
                let mut tail = std::mem::take(&mut chains[j]);
                tail.reverse();
                chains[i].extend(tail);
            }
        }
    }

    chains.retain(|chain| !chain.is_empty());
}

fn ends(chain: &BorderChain) -> (Pixel, Pixel) {
    (chain[0], chain[chain.len() - 1])
}
