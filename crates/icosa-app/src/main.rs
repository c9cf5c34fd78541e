//! Headless driver for the planet renderer.
//!
//! Loads the config, builds a planet and flies a scripted descent towards
//! its surface, logging how the mesh refines on the way down.
//!
//! Run with: `cargo run -p icosa-app -- --frames 300`

mod flight;
mod headless;

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use icosa_config::{CliArgs, Config};
use icosa_planet::Planet;
use tracing::{error, info};

use crate::flight::Descent;
use crate::headless::HeadlessBackend;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    icosa_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    info!(
        "Planet: radius={}, seed={}, max_lod={}, lod_multiplier={}",
        config.planet.radius, config.planet.seed, config.lod.max_lod, config.lod.lod_multiplier
    );

    let mut planet = match Planet::from_config(&config, HeadlessBackend::default()) {
        Ok(planet) => planet,
        Err(e) => {
            error!("Failed to create planet: {e}");
            std::process::exit(1);
        }
    };

    let descent = Descent::new(planet.position(), planet.radius(), &config.flight);
    let frame_rate = config.flight.frame_rate.max(1.0);
    let dt = 1.0 / frame_rate;
    let report_every = (frame_rate as u32).max(1);

    for frame in 0..config.flight.frames {
        planet.draw(dt, &descent.viewer(frame));
        if frame % report_every == 0 {
            let snapshot = planet.latest_snapshot();
            info!(
                frame,
                altitude = descent.altitude(frame),
                generation = snapshot.generation,
                leaves = snapshot.leaf_count,
                triangles = snapshot.triangle_count(),
                min_surface_distance = snapshot.min_surface_distance,
                "descent"
            );
        }
        thread::sleep(Duration::from_secs_f64(dt));
    }

    if let Err(e) = planet.shutdown() {
        error!("Planet shutdown failed: {e}");
    }

    let backend = planet.backend();
    info!(
        "Done: {} frames, {} uniform writes, {} uploads ({} bytes), {} draws ({} wireframe), last draw {} indices, released={}",
        config.flight.frames,
        backend.uniform_writes,
        backend.uploads,
        backend.uploaded_bytes,
        backend.draws,
        backend.wireframe_draws,
        backend.last_index_count,
        backend.released
    );
}
