//! Level-of-detail engine for the planet: a triangular quadtree over the
//! icosahedron with distance-driven splitting and merging, horizon and
//! screen-space culling, and mesh rebuilds of the visible leaves.

mod face;
mod forest;
mod horizon_culling;
mod icosahedron;
mod quadtree;
mod screen_bounds;
mod thresholds;

pub use face::{Face, FaceId};
pub use forest::FaceForest;
pub use horizon_culling::HorizonCuller;
pub use icosahedron::base_faces;
pub use quadtree::{LodSettings, LodView, PlanetQuadtree, TickStats};
pub use screen_bounds::ScreenCuller;
pub use thresholds::{LodThresholds, MAX_SUPPORTED_LOD};
