//! Distance thresholds for splitting and merging faces, with hysteresis.

/// Deepest subdivision level the engine supports. Past this, edge lengths
/// on a unit sphere approach the weld epsilon.
pub const MAX_SUPPORTED_LOD: u8 = 30;

/// Split and merge distances per subdivision level.
///
/// A face at level `L` splits once every corner is closer than
/// `radius * 2^lod_multiplier / 2^L`, and its children merge back once every
/// corner is at least the split distance of level `L - 1` away. The merge
/// distance is twice the split distance, so a viewer hovering at one
/// boundary does not make the tree oscillate.
#[derive(Clone, Debug, PartialEq)]
pub struct LodThresholds {
    base_distance: f64,
    max_lod: u8,
}

impl LodThresholds {
    /// `max_lod` is clamped to [`MAX_SUPPORTED_LOD`].
    pub fn new(radius: f64, lod_multiplier: u32, max_lod: u8) -> Self {
        debug_assert!(radius > 0.0, "radius must be positive");
        Self {
            base_distance: radius * f64::from(lod_multiplier).exp2(),
            max_lod: max_lod.min(MAX_SUPPORTED_LOD),
        }
    }

    /// Deepest level a face may reach.
    pub fn max_lod(&self) -> u8 {
        self.max_lod
    }

    pub fn split_distance(&self, level: u8) -> f64 {
        self.base_distance / f64::from(level).exp2()
    }

    /// Distance at which the children of a level-`level` face are merged.
    /// `None` for level 0: the children of base faces are permanent.
    pub fn merge_distance(&self, level: u8) -> Option<f64> {
        (level > 0).then(|| self.split_distance(level - 1))
    }

    /// Whether a face at `level` may have children at all.
    pub fn can_split(&self, level: u8) -> bool {
        level < self.max_lod
    }

    pub fn should_split(&self, level: u8, max_corner_distance: f64) -> bool {
        self.can_split(level) && max_corner_distance < self.split_distance(level)
    }

    pub fn should_merge(&self, level: u8, min_corner_distance: f64) -> bool {
        self.merge_distance(level)
            .is_some_and(|merge| min_corner_distance >= merge)
    }
}
