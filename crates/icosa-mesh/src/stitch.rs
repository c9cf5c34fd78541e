//! Crack removal between leaves of different levels.
//!
//! When one face is split and its neighbour is not, the split face's edge
//! midpoint is displaced by terrain noise while the coarse neighbour still
//! spans that edge with a straight line. The result is a T-junction and a
//! visible crack. Stitching re-triangulates the coarse leaf so it passes
//! through the finer neighbour's midpoint vertex.

use glam::DVec3;
use icosa_terrain::{PolarCoord, midpoint_direction};
use rustc_hash::FxHashMap;

use crate::weld::{LeafTriangle, WeldedMesh};

type Corner = (DVec3, u32);

struct Stitcher {
    lookup: FxHashMap<[u64; 2], u32>,
}

impl Stitcher {
    fn emit(&self, corners: [Corner; 3], depth: u8, out: &mut Vec<u32>) {
        if depth > 0 {
            for edge in 0..3 {
                let a = corners[edge];
                let b = corners[(edge + 1) % 3];
                let mid = midpoint_direction(a.0, b.0);
                let Some(&vertex) = self.lookup.get(&PolarCoord::from_direction(mid).to_bits())
                else {
                    continue;
                };
                let c = corners[(edge + 2) % 3];
                let m = (mid, vertex);
                self.emit([a, m, c], depth - 1, out);
                self.emit([m, b, c], depth - 1, out);
                return;
            }
        }
        out.extend(corners.map(|(_, vertex)| vertex));
    }
}

/// Index list for `leaves` with every T-junction closed.
///
/// A leaf edge is split wherever a welded vertex sits exactly on the
/// midpoint that subdivision would have created, repeatedly down to
/// `max_depth` splits per leaf. Leaves with an unresolved corner are
/// skipped, as they are by [`weld_leaves`](crate::weld_leaves). Without any
/// T-junctions the output equals `welded.indices`.
pub fn stitch_seams(leaves: &[LeafTriangle], welded: &WeldedMesh, max_depth: u8) -> Vec<u32> {
    let lookup: FxHashMap<[u64; 2], u32> = welded
        .vertex_polar
        .iter()
        .enumerate()
        .map(|(vertex, polar)| (polar.to_bits(), vertex as u32))
        .collect();
    let stitcher = Stitcher { lookup };

    let mut indices = Vec::with_capacity(welded.indices.len() + welded.indices.len() / 8);
    for (leaf, slots) in leaves.iter().zip(&welded.corner_vertices) {
        if slots.contains(&u32::MAX) {
            continue;
        }
        let corners = [0, 1, 2].map(|k| (leaf.directions[k], slots[k]));
        stitcher.emit(corners, max_depth, &mut indices);
    }
    indices
}
