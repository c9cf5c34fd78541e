//! Multi-octave simplex noise over the unit sphere.
//!
//! The planet has no heightmap. Relief comes from displacing every new edge
//! midpoint during subdivision by a noise value scaled with a per-level
//! factor, so coarse levels carve continents and fine levels add roughness.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

/// Parameters of the terrain field and its per-level scaling.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    /// Seed of the simplex permutation table.
    pub seed: u32,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per unit of direction.
    pub base_frequency: f64,
    /// Relative displacement applied at level 0, as a fraction of the
    /// radius.
    pub amplitude: f64,
    /// Exponent on `(level + 1)` in the level factor. Higher values keep
    /// fine levels rough; 0 halves the relief with every level.
    pub regularity: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.5,
            amplitude: 0.05,
            regularity: 1.5,
        }
    }
}

/// Deterministic scalar field over the sphere.
pub struct TerrainNoise {
    noise: Simplex,
    params: TerrainParams,
    /// Sum of all octave amplitudes, used to normalize samples.
    octave_sum: f64,
}

impl TerrainNoise {
    pub fn new(params: TerrainParams) -> Self {
        let noise = Simplex::new(params.seed);
        let mut octave_sum = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves {
            octave_sum += amplitude;
            amplitude *= params.persistence;
        }
        Self {
            noise,
            params,
            octave_sum,
        }
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Sample the field at a direction, normalized to roughly `[-1, 1]`.
    ///
    /// The direction is normalized first, so the field only depends on the
    /// point of the unit sphere it names.
    pub fn sample(&self, direction: DVec3) -> f64 {
        if self.octave_sum <= 0.0 {
            return 0.0;
        }
        let dir = direction.normalize_or_zero();
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            let p = dir * frequency;
            total += self.noise.get([p.x, p.y, p.z]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        (total / self.octave_sum).clamp(-1.0, 1.0)
    }

    /// Relief scale of subdivision level `level`:
    /// `amplitude / 2^level * (level + 1)^regularity`.
    pub fn level_factor(&self, level: u8) -> f64 {
        let level = f64::from(level);
        self.params.amplitude / level.exp2() * (level + 1.0).powf(self.params.regularity)
    }

    /// Radial multiplier for a midpoint created while splitting a face of
    /// level `level`.
    pub fn displacement(&self, direction: DVec3, level: u8) -> f64 {
        1.0 + self.sample(direction) * self.level_factor(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directions() -> Vec<DVec3> {
        (0..64)
            .map(|i| {
                let t = i as f64 * 0.37;
                DVec3::new(t.cos(), (t * 1.7).sin(), (t * 0.3).cos() - 0.5).normalize()
            })
            .collect()
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = TerrainNoise::new(TerrainParams::default());
        let b = TerrainNoise::new(TerrainParams::default());
        for dir in directions() {
            assert_eq!(a.sample(dir), b.sample(dir), "mismatch at {dir:?}");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = TerrainNoise::new(TerrainParams::default());
        let b = TerrainNoise::new(TerrainParams {
            seed: 9001,
            ..TerrainParams::default()
        });
        let differing = directions()
            .into_iter()
            .filter(|&dir| a.sample(dir) != b.sample(dir))
            .count();
        assert!(differing > 32, "only {differing} of 64 samples differ");
    }

    #[test]
    fn test_samples_are_normalized() {
        let noise = TerrainNoise::new(TerrainParams::default());
        for dir in directions() {
            let v = noise.sample(dir);
            assert!((-1.0..=1.0).contains(&v), "sample {v} out of range at {dir:?}");
        }
    }

    #[test]
    fn test_sample_ignores_direction_length() {
        let noise = TerrainNoise::new(TerrainParams::default());
        let dir = DVec3::new(0.4, -0.2, 0.7);
        let a = noise.sample(dir);
        let b = noise.sample(dir * 250.0);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let noise = TerrainNoise::new(TerrainParams {
            octaves: 0,
            ..TerrainParams::default()
        });
        assert_eq!(noise.sample(DVec3::X), 0.0);
        assert_eq!(noise.displacement(DVec3::X, 3), 1.0);
    }

    #[test]
    fn test_level_factor_formula() {
        let noise = TerrainNoise::new(TerrainParams {
            amplitude: 0.08,
            regularity: 2.0,
            ..TerrainParams::default()
        });
        assert!((noise.level_factor(0) - 0.08).abs() < 1e-15);
        // 0.08 / 8 * 4^2
        assert!((noise.level_factor(3) - 0.16).abs() < 1e-15);
    }

    #[test]
    fn test_level_factor_decays_without_regularity() {
        let noise = TerrainNoise::new(TerrainParams {
            regularity: 0.0,
            ..TerrainParams::default()
        });
        for level in 1..20 {
            assert!(noise.level_factor(level) < noise.level_factor(level - 1));
        }
    }

    #[test]
    fn test_zero_amplitude_gives_unit_displacement() {
        let noise = TerrainNoise::new(TerrainParams {
            amplitude: 0.0,
            ..TerrainParams::default()
        });
        for dir in directions() {
            assert_eq!(noise.displacement(dir, 5), 1.0);
        }
    }
}
