use crate::Error;

/// Geometry emitted for each decomposition part.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ColliderShape {
    #[default]
    ConvexHull,
    /// Axis-aligned box around the part's points. Cheaper for physics, less tight.
    Aabb,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum DecompositionPreset {
    Fast,
    #[default]
    Balanced,
    Accurate,
}

/// Settings for a decomposition run. The threshold, resolution, hull limit and extrusion
/// are forwarded to the static-mesh decomposer; `shape` applies to both paths.
#[derive(Clone, Debug, PartialEq)]
pub struct DecompositionParams {
    /// Concavity threshold. Lower values give tighter parts and more of them.
    pub threshold: f32,
    /// Surface sampling resolution.
    pub resolution: u32,
    /// `None` means unlimited.
    pub max_convex_hulls: Option<u32>,
    /// Outward (positive) or inward (negative) growth of each part, as a fraction.
    pub extrude: f32,
    pub shape: ColliderShape,
}

impl Default for DecompositionParams {
    fn default() -> Self {
        Self::preset(DecompositionPreset::default())
    }
}

impl DecompositionParams {
    pub const THRESHOLD_RANGE: (f32, f32) = (0.01, 1.0);
    pub const RESOLUTION_RANGE: (u32, u32) = (100, 10_000);
    pub const MAX_CONVEX_HULLS_LIMIT: u32 = 100;
    pub const EXTRUDE_RANGE: (f32, f32) = (-0.5, 0.5);

    pub fn preset(preset: DecompositionPreset) -> Self {
        let (threshold, resolution, max_convex_hulls) = match preset {
            DecompositionPreset::Fast => (0.5, 1000, Some(10)),
            DecompositionPreset::Balanced => (0.3, 3000, Some(20)),
            DecompositionPreset::Accurate => (0.1, 8000, None),
        };
        Self {
            threshold,
            resolution,
            max_convex_hulls,
            extrude: 0.0,
            shape: ColliderShape::ConvexHull,
        }
    }

    /// Maps a quality in `[0, 1]` (higher is better) onto the concavity threshold.
    pub fn from_quality(quality: f32) -> Self {
        let (lo, hi) = Self::THRESHOLD_RANGE;
        Self {
            threshold: (1.0 - quality).clamp(lo, hi),
            ..Self::default()
        }
    }

    pub fn with_shape(mut self, shape: ColliderShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        let (lo, hi) = Self::THRESHOLD_RANGE;
        if !(lo..=hi).contains(&self.threshold) {
            return Err(Error::InvalidValue {
                message: format!("threshold {} outside [{lo}, {hi}]", self.threshold),
            });
        }
        let (lo, hi) = Self::RESOLUTION_RANGE;
        if !(lo..=hi).contains(&self.resolution) {
            return Err(Error::InvalidValue {
                message: format!("resolution {} outside [{lo}, {hi}]", self.resolution),
            });
        }
        if let Some(max) = self.max_convex_hulls {
            if max == 0 || max > Self::MAX_CONVEX_HULLS_LIMIT {
                return Err(Error::InvalidValue {
                    message: format!(
                        "max_convex_hulls {max} outside [1, {}]",
                        Self::MAX_CONVEX_HULLS_LIMIT
                    ),
                });
            }
        }
        let (lo, hi) = Self::EXTRUDE_RANGE;
        if !(lo..=hi).contains(&self.extrude) {
            return Err(Error::InvalidValue {
                message: format!("extrude {} outside [{lo}, {hi}]", self.extrude),
            });
        }
        Ok(())
    }
}
