//! Level of Detail (LOD) tiers for distance-based detail reduction
//!
//! Chunks are rendered at one of three tiers chosen by the Euclidean distance
//! from the viewport center to the chunk center. Beyond the cull distance a
//! chunk is not drawn at all.
//!
//! - High: every tile as a full hexagon with overlays - under 200 units
//! - Medium: every second tile, simplified and shrunk - under 500 units
//! - Low: one flat rectangle in the dominant terrain color - up to 1000 units

use serde::{Deserialize, Serialize};

/// Distance below which chunks render at full detail
pub const HIGH_DISTANCE: f32 = 200.0;
/// Distance below which chunks render at medium detail
pub const MEDIUM_DISTANCE: f32 = 500.0;
/// Chunks farther than this are culled
pub const CULL_DISTANCE: f32 = 1000.0;

/// Render quality tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderTier {
    High,
    Medium,
    Low,
}

/// Configuration for LOD behavior
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LodConfig {
    /// High tier upper bound (exclusive)
    pub high_distance: f32,
    /// Medium tier upper bound (exclusive)
    pub medium_distance: f32,
    /// Chunks beyond this distance are culled
    pub cull_distance: f32,
    /// Tile stride on both axes for the medium tier
    pub medium_stride: i32,
    /// Hexagon scale for the medium tier
    pub medium_scale: f32,
    /// Sampling stride used to find a low-tier chunk's dominant terrain
    pub low_sample_stride: i32,
    /// Frame time above which a frame is reported as slow
    pub frame_budget_ms: f32,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            high_distance: HIGH_DISTANCE,
            medium_distance: MEDIUM_DISTANCE,
            cull_distance: CULL_DISTANCE,
            medium_stride: 2,
            medium_scale: 0.8,
            low_sample_stride: 10,
            frame_budget_ms: 16.0,
        }
    }
}

impl LodConfig {
    /// Tier for a chunk at `distance`, or `None` when culled
    pub fn tier_for_distance(&self, distance: f32) -> Option<RenderTier> {
        if distance.is_nan() || distance > self.cull_distance {
            return None;
        }
        Some(if distance < self.high_distance {
            RenderTier::High
        } else if distance < self.medium_distance {
            RenderTier::Medium
        } else {
            RenderTier::Low
        })
    }

    /// Thresholds must increase and strides must be positive
    pub fn is_valid(&self) -> bool {
        self.high_distance > 0.0
            && self.high_distance < self.medium_distance
            && self.medium_distance <= self.cull_distance
            && self.medium_stride > 0
            && self.low_sample_stride > 0
            && self.medium_scale > 0.0
            && self.frame_budget_ms > 0.0
    }
}

/// Calculate render tier from distance using the default thresholds
///
/// # Arguments
/// * `distance` - Distance from viewport center to chunk center
///
/// # Returns
/// The tier, or `None` if the chunk is culled
///
/// # Examples
/// ```
/// use hexworld::streaming::lod::{tier_from_distance, RenderTier};
///
/// assert_eq!(tier_from_distance(100.0), Some(RenderTier::High));
/// assert_eq!(tier_from_distance(300.0), Some(RenderTier::Medium));
/// assert_eq!(tier_from_distance(700.0), Some(RenderTier::Low));
/// assert_eq!(tier_from_distance(1200.0), None);
/// ```
pub fn tier_from_distance(distance: f32) -> Option<RenderTier> {
    LodConfig::default().tier_for_distance(distance)
}
