//! Everything needed to construct a [`Planet`](crate::Planet).

use std::time::Duration;

use glam::DVec3;
use icosa_config::Config;
use icosa_lod::LodSettings;
use icosa_render::{RenderMode, SurfacePalette};
use icosa_terrain::TerrainParams;

use crate::error::PlanetError;

#[derive(Clone, Debug, PartialEq)]
pub struct PlanetSettings {
    /// Centre in world space.
    pub position: DVec3,
    pub radius: f64,
    /// Mass in kilograms, exposed for gravity consumers.
    pub mass: f64,
    /// Terrain field, including the seed and regularity exponent.
    pub terrain: TerrainParams,
    pub lod: LodSettings,
    /// Sea level as a fraction of the radius.
    pub sea_level: f64,
    /// Spin rate in degrees per second.
    pub rotation_rate_deg: f64,
    pub rotating: bool,
    pub rotation_axis: DVec3,
    pub palette: SurfacePalette,
    pub render_mode: RenderMode,
    /// Worker sleep when neither the tree nor the viewer changed.
    pub idle_sleep: Duration,
    /// Viewer position (world space) the worker starts from, before the first
    /// frame reports one. Defaults to ten radii above the north pole.
    pub initial_viewer: Option<DVec3>,
}

impl PlanetSettings {
    /// Defaults for a planet at `position` with the given size, mass, seed and
    /// terrain regularity.
    pub fn new(position: DVec3, radius: f64, mass: f64, seed: u32, regularity: f64) -> Self {
        Self {
            position,
            radius,
            mass,
            terrain: TerrainParams {
                seed,
                regularity,
                ..TerrainParams::default()
            },
            lod: LodSettings::default(),
            sea_level: 0.001,
            rotation_rate_deg: 5.0,
            rotating: false,
            rotation_axis: DVec3::Z,
            palette: SurfacePalette::default(),
            render_mode: RenderMode::Solid,
            idle_sleep: Duration::from_millis(1),
            initial_viewer: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let planet = &config.planet;
        let lod = &config.lod;
        let terrain = &config.terrain;
        Self {
            position: DVec3::from_array(planet.position),
            radius: planet.radius,
            mass: planet.mass,
            terrain: TerrainParams {
                seed: planet.seed,
                octaves: terrain.octaves,
                lacunarity: terrain.lacunarity,
                persistence: terrain.persistence,
                base_frequency: terrain.base_frequency,
                amplitude: terrain.amplitude,
                regularity: planet.regularity,
            },
            lod: LodSettings {
                lod_multiplier: lod.lod_multiplier,
                max_lod: lod.max_lod,
                horizon_slack: lod.horizon_slack,
                stitch_seams: lod.stitch_seams,
                screen_culling: lod.screen_culling,
                screen_margin: lod.screen_margin,
            },
            sea_level: planet.sea_level,
            rotation_rate_deg: planet.rotation_rate_deg,
            rotating: planet.rotating,
            rotation_axis: DVec3::from_array(planet.rotation_axis),
            palette: SurfacePalette::default(),
            render_mode: if config.debug.wireframe {
                RenderMode::Wireframe
            } else {
                RenderMode::Solid
            },
            idle_sleep: Duration::from_millis(config.worker.idle_sleep_ms),
            initial_viewer: None,
        }
    }

    /// World-space viewer position the worker uses until the first frame.
    pub fn starting_viewer(&self) -> DVec3 {
        self.initial_viewer
            .unwrap_or(self.position + DVec3::Z * (self.radius * 10.0))
    }

    pub(crate) fn validate(&self) -> Result<(), PlanetError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(PlanetError::InvalidSettings(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }
        if !self.position.is_finite() {
            return Err(PlanetError::InvalidSettings(
                "position must be finite".to_string(),
            ));
        }
        if self.rotation_axis.try_normalize().is_none() {
            return Err(PlanetError::InvalidSettings(
                "rotation axis must be a non-zero vector".to_string(),
            ));
        }
        if !(self.lod.horizon_slack >= 0.0 && self.lod.screen_margin >= 0.0) {
            return Err(PlanetError::InvalidSettings(
                "horizon slack and screen margin must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PlanetSettings {
    fn default() -> Self {
        Self::new(DVec3::ZERO, 1.0, 5.972e24, 0, 1.5)
    }
}
