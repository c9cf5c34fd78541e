//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "planet.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub planet: PlanetConfig,
    pub lod: LodConfig,
    pub terrain: TerrainConfig,
    pub worker: WorkerConfig,
    pub flight: FlightConfig,
    pub debug: DebugConfig,
}

/// The planet body: size, terrain seed, water and spin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetConfig {
    /// Centre in world space.
    pub position: [f64; 3],
    /// Radius of the undisplaced sphere, in world units.
    pub radius: f64,
    /// Mass in kilograms. Carried for gravity consumers; the renderer
    /// ignores it.
    pub mass: f64,
    pub seed: u32,
    /// Exponent that keeps fine subdivision levels rough.
    pub regularity: f64,
    /// Sea level as a fraction of the radius above the sphere.
    pub sea_level: f64,
    /// Spin rate in degrees per second.
    pub rotation_rate_deg: f64,
    pub rotating: bool,
    pub rotation_axis: [f64; 3],
}

/// Quadtree refinement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Split distances are scaled by `2^lod_multiplier`.
    pub lod_multiplier: u32,
    /// Deepest subdivision level.
    pub max_lod: u8,
    /// Horizon plane offset for terrain relief, as a fraction of the radius.
    pub horizon_slack: f64,
    pub stitch_seams: bool,
    pub screen_culling: bool,
    pub screen_margin: f64,
}

/// Noise field that displaces the surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub octaves: u32,
    pub lacunarity: f64,
    pub persistence: f64,
    pub base_frequency: f64,
    /// Level-0 relief as a fraction of the radius.
    pub amplitude: f64,
}

/// Background LOD worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Sleep between ticks when neither the tree nor the viewer changed.
    pub idle_sleep_ms: u64,
}

/// Scripted descent flown by the headless driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlightConfig {
    /// Starting altitude, in planet radii above the surface.
    pub start_altitude: f64,
    /// Final altitude, in planet radii above the surface.
    pub end_altitude: f64,
    pub frames: u32,
    pub frame_rate: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Append one JSON line per mesh rebuild to this file.
    pub diagnostics_path: Option<PathBuf>,
    /// Start in wireframe mode.
    pub wireframe: bool,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            radius: 1.0,
            mass: 5.972e24,
            seed: 0,
            regularity: 1.5,
            sea_level: 0.001,
            rotation_rate_deg: 5.0,
            rotating: false,
            rotation_axis: [0.0, 0.0, 1.0],
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            lod_multiplier: 1,
            max_lod: 12,
            horizon_slack: 0.02,
            stitch_seams: true,
            screen_culling: true,
            screen_margin: 0.25,
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.5,
            amplitude: 0.05,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { idle_sleep_ms: 1 }
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            start_altitude: 9.0,
            end_altitude: 0.002,
            frames: 600,
            frame_rate: 60.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            diagnostics_path: None,
            wireframe: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Per-user config directory, if the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("icosa"))
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file; `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
