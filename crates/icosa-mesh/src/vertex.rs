//! Vertex format of the planet surface mesh.

use bytemuck::{Pod, Zeroable};
use glam::DVec3;
use icosa_terrain::PolarCoord;

/// One vertex of the planet mesh in object space.
///
/// Positions are computed in `f64` and narrowed here. The planet is drawn
/// around its own origin, so object-space magnitudes stay close to the
/// radius and `f32` keeps enough precision.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PlanetVertex {
    pub position: [f32; 3],
    /// Polar texture coordinate, see [`PolarCoord::uv`].
    pub uv: [f32; 2],
    pub normal: [f32; 3],
}

static_assertions::assert_eq_size!(PlanetVertex, [u8; 32]);

impl PlanetVertex {
    pub fn new(position: DVec3, polar: PolarCoord, normal: DVec3) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            uv: polar.uv(),
            normal: normal.as_vec3().to_array(),
        }
    }
}
