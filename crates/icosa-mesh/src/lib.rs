//! Planet mesh data: the GPU vertex type, corner welding, seam stitching and
//! the snapshot exchange between the LOD worker and the render thread.

mod exchange;
mod snapshot;
mod stitch;
mod vertex;
mod weld;

pub use exchange::MeshExchange;
pub use snapshot::MeshSnapshot;
pub use stitch::stitch_seams;
pub use vertex::PlanetVertex;
pub use weld::{LeafTriangle, WELD_EPSILON, WELD_WINDOW, WeldedMesh, weld_leaves};
