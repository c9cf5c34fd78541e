//! [`ShadingBackend`] over wgpu buffers.
//!
//! The planet hands over whole meshes, so every upload allocates fresh
//! vertex and index buffers rather than writing into old ones; uploads only
//! happen when the LOD worker publishes a new snapshot. Drawing is deferred:
//! `draw_indexed` records the call and [`WgpuPlanetBackend::encode`] replays
//! it into the caller's render pass once the pipeline is bound.

use icosa_mesh::PlanetVertex;
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::backend::{RenderMode, ShadingBackend};
use crate::uniforms::PlanetUniforms;

const LABEL: &str = "planet";

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

pub struct WgpuPlanetBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    uniforms: Option<wgpu::Buffer>,
    mesh: Option<MeshBuffers>,
    pending: Option<(u32, RenderMode)>,
}

impl WgpuPlanetBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("planet-uniforms"),
            size: std::mem::size_of::<PlanetUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            device: device.clone(),
            queue: queue.clone(),
            uniforms: Some(uniforms),
            mesh: None,
            pending: None,
        }
    }

    /// Uniform buffer for the caller's bind group. `None` after release.
    pub fn uniform_buffer(&self) -> Option<&wgpu::Buffer> {
        self.uniforms.as_ref()
    }

    /// Render mode of the draw waiting to be encoded, so the caller can pick
    /// the matching pipeline.
    pub fn pending_mode(&self) -> Option<RenderMode> {
        self.pending.map(|(_, mode)| mode)
    }

    /// Index count of the last upload.
    pub fn uploaded_index_count(&self) -> u32 {
        self.mesh.as_ref().map_or(0, |mesh| mesh.index_count)
    }

    /// Bind the mesh and issue the recorded draw. Returns false when there is
    /// nothing to draw. The recorded draw is consumed by the next
    /// `draw_indexed`, not by this call, so a frame may be encoded into
    /// several passes.
    pub fn encode<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) -> bool {
        let (Some(mesh), Some((count, _))) = (&self.mesh, self.pending) else {
            return false;
        };
        let count = count.min(mesh.index_count);
        if count == 0 {
            return false;
        }
        render_pass.set_vertex_buffer(0, mesh.vertices.slice(..));
        render_pass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..count, 0, 0..1);
        true
    }
}

impl ShadingBackend for WgpuPlanetBackend {
    fn set_uniforms(&mut self, uniforms: &PlanetUniforms) {
        if let Some(buffer) = &self.uniforms {
            self.queue.write_buffer(buffer, 0, uniforms.as_bytes());
        }
    }

    fn upload_mesh(&mut self, vertices: &[PlanetVertex], indices: &[u32]) {
        if let Some(old) = self.mesh.take() {
            old.vertices.destroy();
            old.indices.destroy();
        }
        if vertices.is_empty() || indices.is_empty() {
            return;
        }
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{LABEL}-vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{LABEL}-indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });
        debug!(
            vertices = vertices.len(),
            indices = indices.len(),
            "uploaded planet mesh"
        );
        self.mesh = Some(MeshBuffers {
            vertices: vertex_buffer,
            indices: index_buffer,
            index_count: indices.len() as u32,
        });
    }

    fn draw_indexed(&mut self, index_count: u32, mode: RenderMode) {
        self.pending = Some((index_count, mode));
    }

    fn release(&mut self) {
        self.pending = None;
        if let Some(mesh) = self.mesh.take() {
            mesh.vertices.destroy();
            mesh.indices.destroy();
        }
        if let Some(uniforms) = self.uniforms.take() {
            uniforms.destroy();
        }
    }
}
