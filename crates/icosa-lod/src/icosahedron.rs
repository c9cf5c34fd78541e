//! The 20 base faces of the planet.

use std::f64::consts::PI;

use glam::DVec3;

/// Elevation of the two pentagon rings above and below the equator,
/// `atan(1/2)` in degrees.
const RING_ELEVATION_DEG: f64 = 26.56505117707799;

/// Vertex triples of the 20 faces, counter-clockwise seen from outside.
/// Vertex 0 is the south pole, 1..=5 the southern ring, 6..=10 the northern
/// ring and 11 the north pole.
const FACES: [[usize; 3]; 20] = [
    [0, 2, 1],
    [0, 3, 2],
    [0, 4, 3],
    [0, 5, 4],
    [0, 1, 5],
    [1, 2, 7],
    [2, 3, 8],
    [3, 4, 9],
    [4, 5, 10],
    [5, 1, 6],
    [1, 7, 6],
    [2, 8, 7],
    [3, 9, 8],
    [4, 10, 9],
    [5, 6, 10],
    [6, 7, 11],
    [7, 8, 11],
    [8, 9, 11],
    [9, 10, 11],
    [10, 6, 11],
];

fn vertices(radius: f64) -> [DVec3; 12] {
    let (sine, cosine) = RING_ELEVATION_DEG.to_radians().sin_cos();
    let step = 2.0 * PI / 5.0;
    let mut v = [DVec3::ZERO; 12];
    v[0] = DVec3::NEG_Z;
    for i in 0..5 {
        let phi = PI / 5.0 + step * i as f64;
        v[1 + i] = DVec3::new(cosine * phi.cos(), cosine * phi.sin(), -sine);
    }
    for i in 0..5 {
        let phi = step * i as f64;
        v[6 + i] = DVec3::new(cosine * phi.cos(), cosine * phi.sin(), sine);
    }
    v[11] = DVec3::Z;
    v.map(|p| p * radius)
}

/// Corner positions of the base faces of a planet of `radius`.
pub fn base_faces(radius: f64) -> [[DVec3; 3]; 20] {
    let v = vertices(radius);
    FACES.map(|[a, b, c]| [v[a], v[b], v[c]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_lie_on_sphere() {
        for p in vertices(3.0) {
            assert!((p.length() - 3.0).abs() < 1e-12, "vertex {p:?} off sphere");
        }
    }

    #[test]
    fn test_faces_wind_outward() {
        for [a, b, c] in base_faces(1.0) {
            let normal = (b - a).cross(c - a);
            assert!(normal.dot(a + b + c) > 0.0, "face {a:?} {b:?} {c:?} winds inward");
        }
    }

    #[test]
    fn test_edges_are_equal_length() {
        let faces = base_faces(1.0);
        let expected = faces[0][0].distance(faces[0][1]);
        for [a, b, c] in faces {
            for len in [a.distance(b), b.distance(c), c.distance(a)] {
                assert!((len - expected).abs() < 1e-9, "edge {len} != {expected}");
            }
        }
    }

    #[test]
    fn test_every_edge_shared_by_two_faces() {
        let mut edges = std::collections::HashMap::new();
        for [a, b, c] in FACES {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                *edges.entry((p.min(q), p.max(q))).or_insert(0) += 1;
            }
        }
        assert_eq!(edges.len(), 30);
        assert!(edges.values().all(|&n| n == 2));
    }
}
