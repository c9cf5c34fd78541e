//! Procedural terrain for the planet surface: polar parameterization of the
//! unit sphere and multi-octave noise displacement of subdivision midpoints.

mod polar;
mod relief;

pub use polar::{PolarCoord, midpoint_direction};
pub use relief::{TerrainNoise, TerrainParams};
