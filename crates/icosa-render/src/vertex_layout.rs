//! `wgpu::VertexBufferLayout` for [`PlanetVertex`].
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x2 | uv       |
//! | 2        | 20     | Float32x3 | normal   |

use std::mem;

use icosa_mesh::PlanetVertex;
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

pub const PLANET_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 20,
        shader_location: 2,
    },
];

pub const PLANET_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<PlanetVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &PLANET_VERTEX_ATTRIBUTES,
};

/// [`PLANET_VERTEX_LAYOUT`] as an owned value.
pub fn planet_vertex_buffer_layout() -> VertexBufferLayout<'static> {
    PLANET_VERTEX_LAYOUT
}

const _: () = assert!(
    mem::size_of::<PlanetVertex>() == 32,
    "PlanetVertex size changed, update PLANET_VERTEX_LAYOUT"
);
const _: () = assert!(PLANET_VERTEX_ATTRIBUTES[2].offset + 12 == mem::size_of::<PlanetVertex>() as u64);
