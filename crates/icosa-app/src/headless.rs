//! A shading backend that only counts what it is asked to do.

use icosa_mesh::PlanetVertex;
use icosa_render::{PlanetUniforms, RenderMode, ShadingBackend};
use tracing::trace;

/// Stands in for a GPU when the planet is driven without a window.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub uniform_writes: u64,
    pub uploads: u64,
    pub uploaded_bytes: u64,
    pub draws: u64,
    pub wireframe_draws: u64,
    pub last_index_count: u32,
    pub released: bool,
}

impl ShadingBackend for HeadlessBackend {
    fn set_uniforms(&mut self, _uniforms: &PlanetUniforms) {
        self.uniform_writes += 1;
    }

    fn upload_mesh(&mut self, vertices: &[PlanetVertex], indices: &[u32]) {
        let bytes = std::mem::size_of_val(vertices) + std::mem::size_of_val(indices);
        self.uploads += 1;
        self.uploaded_bytes += bytes as u64;
        trace!(vertices = vertices.len(), indices = indices.len(), "mesh upload");
    }

    fn draw_indexed(&mut self, index_count: u32, mode: RenderMode) {
        self.draws += 1;
        if mode == RenderMode::Wireframe {
            self.wireframe_draws += 1;
        }
        self.last_index_count = index_count;
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_calls() {
        let mut backend = HeadlessBackend::default();
        backend.upload_mesh(&[PlanetVertex::default(); 3], &[0, 1, 2]);
        backend.draw_indexed(3, RenderMode::Wireframe);
        backend.release();
        assert_eq!(backend.uploads, 1);
        assert_eq!(backend.uploaded_bytes, 3 * 32 + 3 * 4);
        assert_eq!(backend.wireframe_draws, 1);
        assert_eq!(backend.last_index_count, 3);
        assert!(backend.released);
    }
}
