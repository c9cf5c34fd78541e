//! Shading side of the planet: the backend trait the planet draws through,
//! the uniform block it fills every frame, and a wgpu implementation.

mod backend;
mod uniforms;
mod vertex_layout;
mod wgpu_backend;

pub use backend::{RenderMode, ShadingBackend};
pub use uniforms::{PlanetUniforms, SurfacePalette};
pub use vertex_layout::{PLANET_VERTEX_ATTRIBUTES, PLANET_VERTEX_LAYOUT, planet_vertex_buffer_layout};
pub use wgpu_backend::WgpuPlanetBackend;
