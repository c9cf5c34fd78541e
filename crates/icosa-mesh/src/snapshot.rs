//! Immutable mesh published by the LOD worker.

use std::time::Duration;

use crate::vertex::PlanetVertex;

/// One complete rebuild of the planet mesh.
///
/// Snapshots are never mutated after publication; the render thread holds
/// them behind an `Arc` for as long as it needs.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshSnapshot {
    /// Publication counter assigned by [`MeshExchange`](crate::MeshExchange).
    /// Zero for a snapshot that was never published.
    pub generation: u64,
    pub vertices: Vec<PlanetVertex>,
    pub indices: Vec<u32>,
    /// Leaves collected by the rebuild, before stitching.
    pub leaf_count: usize,
    /// Smallest corner distance from the viewer among every face visited
    /// by the rebuild. Infinite when nothing was visited.
    pub min_surface_distance: f64,
    pub build_time: Duration,
}

impl MeshSnapshot {
    pub fn empty() -> Self {
        Self {
            generation: 0,
            vertices: Vec::new(),
            indices: Vec::new(),
            leaf_count: 0,
            min_surface_distance: f64::INFINITY,
            build_time: Duration::ZERO,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Default for MeshSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
