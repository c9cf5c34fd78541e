//! A procedurally generated planet that refines its own surface as the
//! viewer moves.
//!
//! [`Planet`] owns a background thread that keeps the LOD quadtree in step
//! with the latest viewer position and publishes finished meshes. The render
//! thread calls [`Planet::draw`] once per frame, which uploads the newest
//! mesh through a [`ShadingBackend`](icosa_render::ShadingBackend) and draws
//! it.

mod diagnostics;
mod error;
mod planet;
mod rotation;
mod settings;
mod viewer;
mod worker;


pub use diagnostics::{DiagnosticSink, JsonLinesSink, MemorySink, RebuildSample};
pub use error::PlanetError;
pub use planet::Planet;
pub use rotation::{RotationState, sun_direction};
pub use settings::PlanetSettings;
pub use viewer::ViewerState;
