//! The seam between the planet and whatever draws it.

use icosa_mesh::PlanetVertex;

use crate::uniforms::PlanetUniforms;

/// How the planet surface is rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Solid,
    Wireframe,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Solid => RenderMode::Wireframe,
            RenderMode::Wireframe => RenderMode::Solid,
        }
    }
}

/// Receives everything the planet produces for display.
///
/// Calls arrive on the render thread only. Within a frame the order is
/// `set_uniforms`, then at most one `upload_mesh`, then at most one
/// `draw_indexed`. `release` is called once, after the mesh worker has
/// stopped; nothing is called after it.
pub trait ShadingBackend {
    fn set_uniforms(&mut self, uniforms: &PlanetUniforms);

    /// Replace the GPU copy of the mesh. Either slice may be empty.
    fn upload_mesh(&mut self, vertices: &[PlanetVertex], indices: &[u32]);

    /// Draw the first `index_count` indices of the last upload.
    fn draw_indexed(&mut self, index_count: u32, mode: RenderMode);

    /// Free every GPU object owned for the planet.
    fn release(&mut self);
}
