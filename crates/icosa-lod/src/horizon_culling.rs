//! Horizon culling for the planet sphere.
//!
//! Works in planet object space, with the planet centre at the origin. A
//! surface point is hidden once it lies beyond the plane through the
//! horizon circle as seen from the viewer.

use glam::DVec3;

/// Horizon plane computed from the viewer position and the planet radius.
#[derive(Clone, Debug)]
pub struct HorizonCuller {
    /// Unit vector from the planet centre towards the viewer.
    viewer_dir: DVec3,
    radius: f64,
    /// Distance from the viewer to the planet centre.
    viewer_distance: f64,
    /// Offset of the horizon plane along `viewer_dir`, lowered by the relief
    /// slack. Points with a smaller projection are below the horizon.
    plane_offset: f64,
}

impl HorizonCuller {
    /// `slack` is a fraction of the radius subtracted from the plane offset so
    /// that raised terrain just past the smooth-sphere horizon stays visible.
    pub fn new(viewer: DVec3, radius: f64, slack: f64) -> Self {
        let viewer_distance = viewer.length();
        let viewer_dir = viewer.normalize_or_zero();

        // For a sphere of radius r seen from distance d, the tangent points
        // all lie on the plane dot(p, n) = r^2 / d.
        let plane_offset = if viewer_distance > radius {
            radius * radius / viewer_distance - slack * radius
        } else {
            f64::NEG_INFINITY
        };

        Self {
            viewer_dir,
            radius,
            viewer_distance,
            plane_offset,
        }
    }

    /// Whether the viewer is inside (or on) the undisplaced sphere, in which
    /// case nothing is culled.
    pub fn is_inside(&self) -> bool {
        self.viewer_distance <= self.radius
    }

    pub fn is_point_visible(&self, point: DVec3) -> bool {
        self.is_inside() || point.dot(self.viewer_dir) >= self.plane_offset
    }

    /// Whether any part of a sphere reaches above the horizon plane.
    pub fn is_sphere_visible(&self, center: DVec3, radius: f64) -> bool {
        self.is_inside() || center.dot(self.viewer_dir) + radius >= self.plane_offset
    }

    /// Conservative face test against the sphere around the centroid that
    /// encloses all three corners. A face can only be rejected when every
    /// point of it is below the horizon.
    pub fn is_face_visible(&self, corners: &[DVec3; 3]) -> bool {
        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        let reach = corners
            .iter()
            .map(|c| c.distance(centroid))
            .fold(0.0, f64::max);
        self.is_sphere_visible(centroid, reach)
    }
}
