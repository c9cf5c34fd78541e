//! One triangular patch of the planet surface.

use glam::DVec3;
use icosa_mesh::LeafTriangle;
use icosa_terrain::PolarCoord;

/// Generational handle to a face in a [`FaceForest`](crate::FaceForest).
///
/// A handle outlives the face it names; once the face is freed the handle
/// resolves to nothing, even if its slot has been reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FaceId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// A node of the planet quadtree.
///
/// Either a leaf or fully expanded into four children; partial expansion is
/// never stored. Corners wind counter-clockwise seen from outside the
/// planet.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    /// Displaced corner positions in planet object space.
    pub corners: [DVec3; 3],
    /// Unit directions of the corners. Children copy these from their parent
    /// instead of renormalizing, so shared corners stay bit-identical.
    pub directions: [DVec3; 3],
    pub polar: [PolarCoord; 3],
    /// Subdivision depth, 0 for the base icosahedron.
    pub level: u8,
    pub parent: Option<FaceId>,
    pub children: Option<[FaceId; 4]>,
}

impl Face {
    /// A base face; directions are derived from the corners.
    pub fn root(corners: [DVec3; 3]) -> Self {
        Self::with_directions(corners, corners.map(DVec3::normalize), 0, None)
    }

    pub fn with_directions(
        corners: [DVec3; 3],
        directions: [DVec3; 3],
        level: u8,
        parent: Option<FaceId>,
    ) -> Self {
        Self {
            corners,
            directions,
            polar: directions.map(PolarCoord::from_direction),
            level,
            parent,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Unit normal of the flat triangle.
    pub fn normal(&self) -> DVec3 {
        let [a, b, c] = self.corners;
        (b - a).cross(c - a).normalize_or_zero()
    }

    pub fn centroid(&self) -> DVec3 {
        (self.corners[0] + self.corners[1] + self.corners[2]) / 3.0
    }

    pub fn max_corner_distance(&self, viewer: DVec3) -> f64 {
        self.corners
            .iter()
            .map(|c| c.distance(viewer))
            .fold(0.0, f64::max)
    }

    pub fn min_corner_distance(&self, viewer: DVec3) -> f64 {
        self.corners
            .iter()
            .map(|c| c.distance(viewer))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn leaf_triangle(&self) -> LeafTriangle {
        LeafTriangle::new(self.corners, self.directions, self.polar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face() -> Face {
        Face::root([DVec3::X * 2.0, DVec3::Y * 2.0, DVec3::Z * 2.0])
    }

    #[test]
    fn test_root_normalizes_directions() {
        let f = face();
        assert_eq!(f.directions, [DVec3::X, DVec3::Y, DVec3::Z]);
        assert_eq!(f.level, 0);
        assert!(f.parent.is_none());
        assert!(f.is_leaf());
    }

    #[test]
    fn test_corner_distances() {
        let f = face();
        let viewer = DVec3::X * 3.0;
        assert!((f.min_corner_distance(viewer) - 1.0).abs() < 1e-12);
        assert!((f.max_corner_distance(viewer) - 13.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_normal_points_outward() {
        let f = face();
        assert!(f.normal().dot(f.centroid()) > 0.0);
    }

    #[test]
    fn test_leaf_triangle_copies_geometry() {
        let f = face();
        let leaf = f.leaf_triangle();
        assert_eq!(leaf.positions, f.corners);
        assert_eq!(leaf.polar, f.polar);
        assert!((leaf.normal - f.normal()).length() < 1e-12);
    }
}
