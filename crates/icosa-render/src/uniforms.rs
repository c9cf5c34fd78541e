//! Per-frame uniform block of the planet shader.

use bytemuck::{Pod, Zeroable};
use glam::{DMat4, DVec3};

/// Surface colours, RGBA in linear space, from deepest to highest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePalette {
    pub deep_water: [f32; 4],
    pub shallow_water: [f32; 4],
    pub land: [f32; 4],
    pub peak: [f32; 4],
}

impl Default for SurfacePalette {
    fn default() -> Self {
        Self {
            deep_water: [0.02, 0.06, 0.25, 1.0],
            shallow_water: [0.05, 0.30, 0.55, 1.0],
            land: [0.18, 0.42, 0.12, 1.0],
            peak: [0.92, 0.92, 0.95, 1.0],
        }
    }
}

/// Uniform block layout shared with the planet shader.
///
/// Matrices are column-major. `origin.w` carries the planet radius so the
/// shader can recover altitude from object-space positions.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlanetUniforms {
    /// View-projection times model.
    pub transform: [[f32; 4]; 4],
    /// Model matrix: planet translation and rotation.
    pub model: [[f32; 4]; 4],
    /// Unit direction towards the sun, w unused.
    pub sun_direction: [f32; 4],
    pub palette: [[f32; 4]; 4],
    pub origin: [f32; 4],
    /// Planet clock in seconds.
    pub time: f32,
    /// Sea level as a fraction of the radius above the undisplaced sphere.
    pub sea_level: f32,
    pub _padding: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<PlanetUniforms>(), 240);
static_assertions::const_assert_eq!(std::mem::size_of::<PlanetUniforms>() % 16, 0);

impl PlanetUniforms {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transform: DMat4,
        model: DMat4,
        sun_direction: DVec3,
        palette: &SurfacePalette,
        origin: DVec3,
        radius: f64,
        time: f64,
        sea_level: f64,
    ) -> Self {
        Self {
            transform: transform.as_mat4().to_cols_array_2d(),
            model: model.as_mat4().to_cols_array_2d(),
            sun_direction: sun_direction.as_vec3().extend(0.0).to_array(),
            palette: [
                palette.deep_water,
                palette.shallow_water,
                palette.land,
                palette.peak,
            ],
            origin: origin.as_vec3().extend(radius as f32).to_array(),
            time: time as f32,
            sea_level: sea_level as f32,
            _padding: [0.0; 2],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
