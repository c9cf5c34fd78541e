//! Welding of leaf triangle corners into a shared, indexed vertex list.
//!
//! Neighbouring leaves carry their own copies of shared corners. Welding
//! sorts every corner by its polar weld key and merges entries whose polar
//! coordinates agree, so each surface point becomes one vertex whose normal
//! is the normalized sum of the normals of every face touching it.

use glam::DVec3;
use icosa_terrain::PolarCoord;

use crate::vertex::PlanetVertex;

/// Number of following sort entries compared against each new vertex.
///
/// A vertex of the subdivided icosahedron is shared by at most six faces, so
/// coincident corners always fall within this window of one another.
pub const WELD_WINDOW: usize = 6;

/// Polar coordinates closer than this on both axes weld into one vertex.
pub const WELD_EPSILON: f64 = 1e-12;

const UNASSIGNED: u32 = u32::MAX;

/// A visible leaf face, as collected by a mesh rebuild.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeafTriangle {
    /// Displaced corner positions in object space.
    pub positions: [DVec3; 3],
    /// Unit directions of the corners.
    pub directions: [DVec3; 3],
    pub polar: [PolarCoord; 3],
    /// Unit face normal, counter-clockwise winding seen from outside.
    pub normal: DVec3,
}

impl LeafTriangle {
    pub fn new(positions: [DVec3; 3], directions: [DVec3; 3], polar: [PolarCoord; 3]) -> Self {
        let [a, b, c] = positions;
        Self {
            positions,
            directions,
            polar,
            normal: (b - a).cross(c - a).normalize_or_zero(),
        }
    }
}

/// Output of [`weld_leaves`].
#[derive(Clone, Debug, Default)]
pub struct WeldedMesh {
    pub vertices: Vec<PlanetVertex>,
    /// Three indices per fully resolved leaf, in leaf order.
    pub indices: Vec<u32>,
    /// Output vertex of every leaf corner, parallel to the input leaves.
    pub corner_vertices: Vec<[u32; 3]>,
    /// Polar coordinate each output vertex was created from.
    pub vertex_polar: Vec<PolarCoord>,
}

/// Weld the corners of `leaves` into an indexed mesh.
///
/// The sort is stable and keyed only on the corner coordinates, so the same
/// leaves in the same order always produce bit-identical output.
pub fn weld_leaves(leaves: &[LeafTriangle]) -> WeldedMesh {
    let corner_count = leaves.len() * 3;
    let corner = |slot: usize| (&leaves[slot / 3], slot % 3);

    let mut order: Vec<(f64, usize)> = (0..corner_count)
        .map(|slot| {
            let (leaf, c) = corner(slot);
            (leaf.polar[c].weld_key(), slot)
        })
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut assigned = vec![UNASSIGNED; corner_count];
    let mut vertices = Vec::with_capacity(corner_count / 2);
    let mut vertex_polar = Vec::with_capacity(corner_count / 2);

    for (i, &(_, slot)) in order.iter().enumerate() {
        if assigned[slot] != UNASSIGNED {
            continue;
        }
        let vertex = vertices.len() as u32;
        let (leaf, c) = corner(slot);
        let polar = leaf.polar[c];
        assigned[slot] = vertex;

        let mut normal = leaf.normal;
        for &(_, other) in order.iter().skip(i + 1).take(WELD_WINDOW) {
            if assigned[other] != UNASSIGNED {
                continue;
            }
            let (other_leaf, oc) = corner(other);
            if other_leaf.polar[oc].approx_eq(polar, WELD_EPSILON) {
                assigned[other] = vertex;
                normal += other_leaf.normal;
            }
        }

        let normal = normal.try_normalize().unwrap_or(leaf.directions[c]);
        vertices.push(PlanetVertex::new(leaf.positions[c], polar, normal));
        vertex_polar.push(polar);
    }

    let mut indices = Vec::with_capacity(corner_count);
    let corner_vertices: Vec<[u32; 3]> = assigned
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    for tri in &corner_vertices {
        if tri.iter().all(|&v| v != UNASSIGNED) {
            indices.extend_from_slice(tri);
        }
    }

    WeldedMesh {
        vertices,
        indices,
        corner_vertices,
        vertex_polar,
    }
}
