//! Screen-space culling of faces during mesh rebuild.
//!
//! Each face corner is projected with the object-space view-projection
//! matrix. A face whose normalized-device bounding rectangle misses the
//! viewport is skipped together with its subtree.

use glam::{DMat4, DVec2, DVec3};

/// Clip-space `w` below which a corner is treated as behind the eye.
const W_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct ScreenCuller {
    view_projection: DMat4,
    /// Extra NDC extent accepted on every side of the viewport. Children
    /// bulge past their parent's flat triangle, so a parent that only just
    /// misses the screen may still have visible descendants.
    margin: f64,
}

impl ScreenCuller {
    pub fn new(view_projection: DMat4, margin: f64) -> Self {
        Self {
            view_projection,
            margin,
        }
    }

    /// Project a point to normalized device coordinates, or `None` when it is
    /// at or behind the eye plane.
    pub fn project(&self, point: DVec3) -> Option<DVec2> {
        let clip = self.view_projection * point.extend(1.0);
        (clip.w > W_EPSILON).then(|| clip.truncate().truncate() / clip.w)
    }

    /// Whether any part of the face may land on screen. Faces with a corner
    /// behind the eye are always kept.
    pub fn is_face_visible(&self, corners: &[DVec3; 3]) -> bool {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for &corner in corners {
            let Some(ndc) = self.project(corner) else {
                return true;
            };
            min = min.min(ndc);
            max = max.max(ndc);
        }
        let limit = 1.0 + self.margin;
        max.x >= -limit && min.x <= limit && max.y >= -limit && min.y <= limit
    }
}
