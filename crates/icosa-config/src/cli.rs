//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Icosa command-line arguments.
///
/// CLI values override settings loaded from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "icosa", about = "Adaptive procedural planet renderer")]
pub struct CliArgs {
    /// Planet radius.
    #[arg(long)]
    pub radius: Option<f64>,

    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Deepest subdivision level.
    #[arg(long)]
    pub max_lod: Option<u8>,

    /// Split distance multiplier exponent.
    #[arg(long)]
    pub lod_multiplier: Option<u32>,

    /// Number of frames the headless driver renders.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Start in wireframe mode.
    #[arg(long)]
    pub wireframe: bool,

    /// Append rebuild diagnostics as JSON lines to this file.
    #[arg(long)]
    pub diagnostics: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(radius) = args.radius {
            self.planet.radius = radius;
        }
        if let Some(seed) = args.seed {
            self.planet.seed = seed;
        }
        if let Some(max_lod) = args.max_lod {
            self.lod.max_lod = max_lod;
        }
        if let Some(multiplier) = args.lod_multiplier {
            self.lod.lod_multiplier = multiplier;
        }
        if let Some(frames) = args.frames {
            self.flight.frames = frames;
        }
        if args.wireframe {
            self.debug.wireframe = true;
        }
        if let Some(ref path) = args.diagnostics {
            self.debug.diagnostics_path = Some(path.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
