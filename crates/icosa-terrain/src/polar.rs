//! Longitude/latitude parameterization of the unit sphere.
//!
//! Every face corner carries one of these. It doubles as the texture
//! coordinate of the corner and as the identity used when welding coincident
//! corners of neighbouring faces into one vertex.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// Latitude weight of the weld sort key. Spreads points that share a
/// longitude but differ in latitude further apart than their longitudes do.
const WELD_KEY_LATITUDE_STRIDE: f64 = 8.0;

/// A point on the unit sphere in polar form, in radians.
///
/// The polar axis is +Z. Longitude is measured from +X towards +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolarCoord {
    /// Angle around the polar axis, in `[-π, π]`.
    pub longitude: f64,
    /// Angle above the equator, in `[-π/2, π/2]`.
    pub latitude: f64,
}

impl PolarCoord {
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Polar coordinate of a direction. The direction does not need to be
    /// normalized; a zero vector maps to longitude 0, latitude 0.
    pub fn from_direction(direction: DVec3) -> Self {
        let n = direction.normalize_or_zero();
        Self {
            longitude: n.y.atan2(n.x),
            latitude: n.z.clamp(-1.0, 1.0).asin(),
        }
    }

    /// Texture coordinate in `[0, 1]²`.
    pub fn uv(self) -> [f32; 2] {
        [
            (self.longitude / TAU + 0.5) as f32,
            (self.latitude / PI + 0.5) as f32,
        ]
    }

    /// Component-wise equality within `epsilon`.
    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.longitude - other.longitude).abs() <= epsilon
            && (self.latitude - other.latitude).abs() <= epsilon
    }

    /// One-dimensional sort key. Identical coordinates get identical keys and
    /// coordinates equal within a small epsilon get keys within a few
    /// epsilons of each other. Distinct points may still share a key, so a
    /// weld must compare the coordinates themselves.
    pub fn weld_key(self) -> f64 {
        self.latitude * WELD_KEY_LATITUDE_STRIDE + self.longitude
    }

    /// Exact bit pattern, usable as a hash key for coordinates produced by
    /// the same computation.
    pub fn to_bits(self) -> [u64; 2] {
        [self.longitude.to_bits(), self.latitude.to_bits()]
    }
}

/// Direction of the midpoint between two corner directions: the normalized
/// average of the two. Subdivision and seam stitching must both use this so
/// their midpoints agree bit for bit.
pub fn midpoint_direction(a: DVec3, b: DVec3) -> DVec3 {
    ((a + b) * 0.5).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_axes_map_to_expected_angles() {
        let x = PolarCoord::from_direction(DVec3::X);
        assert!(x.approx_eq(PolarCoord::new(0.0, 0.0), EPS));

        let y = PolarCoord::from_direction(DVec3::Y);
        assert!((y.longitude - PI / 2.0).abs() < EPS);

        let north = PolarCoord::from_direction(DVec3::Z);
        assert!((north.latitude - PI / 2.0).abs() < EPS);

        let south = PolarCoord::from_direction(DVec3::NEG_Z);
        assert!((south.latitude + PI / 2.0).abs() < EPS);
    }

    #[test]
    fn test_unnormalized_input_gives_same_coordinate() {
        let dir = DVec3::new(1.0, 2.0, -0.5);
        let a = PolarCoord::from_direction(dir);
        let b = PolarCoord::from_direction(dir * 1000.0);
        assert!(a.approx_eq(b, EPS));
    }

    #[test]
    fn test_uv_stays_in_unit_square() {
        for dir in [
            DVec3::X,
            DVec3::NEG_X,
            DVec3::Y,
            DVec3::NEG_Y,
            DVec3::Z,
            DVec3::NEG_Z,
            DVec3::new(-1.0, -0.0001, 0.2),
        ] {
            let [u, v] = PolarCoord::from_direction(dir).uv();
            assert!((0.0..=1.0).contains(&u), "u out of range for {dir:?}: {u}");
            assert!((0.0..=1.0).contains(&v), "v out of range for {dir:?}: {v}");
        }
    }

    #[test]
    fn test_equal_coordinates_share_weld_key() {
        let a = PolarCoord::from_direction(DVec3::new(0.2, 0.4, 0.9));
        let b = PolarCoord::from_direction(DVec3::new(0.2, 0.4, 0.9));
        assert_eq!(a.weld_key(), b.weld_key());
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_weld_key_sorts_duplicates_together() {
        let dirs = [
            DVec3::new(0.3, -0.8, 0.52),
            DVec3::new(-0.7, 0.1, -0.2),
            DVec3::new(0.0, 0.6, 0.8),
        ];
        let mut coords: Vec<PolarCoord> = dirs
            .iter()
            .chain(dirs.iter().rev())
            .map(|&d| PolarCoord::from_direction(d))
            .collect();
        coords.sort_by(|a, b| a.weld_key().total_cmp(&b.weld_key()));
        for pair in coords.chunks_exact(2) {
            assert_eq!(pair[0].to_bits(), pair[1].to_bits());
        }
    }

    #[test]
    fn test_nearby_coordinates_have_nearby_keys() {
        let a = PolarCoord::new(1.0, 0.5);
        let b = PolarCoord::new(1.0 + 1e-13, 0.5 - 1e-13);
        assert!((a.weld_key() - b.weld_key()).abs() < 1e-11);
    }

    #[test]
    fn test_midpoint_direction_is_unit_and_symmetric() {
        let a = DVec3::new(1.0, 0.0, 0.0);
        let b = DVec3::new(0.0, 1.0, 0.0);
        let m = midpoint_direction(a, b);
        assert!((m.length() - 1.0).abs() < EPS);
        assert_eq!(m, midpoint_direction(b, a));
        assert!((m.x - m.y).abs() < EPS);
    }
}
