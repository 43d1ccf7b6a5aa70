//! Distance culling, tier assignment and front-to-back chunk sorting

use crate::core::types::Vec2;
use crate::streaming::lod::{LodConfig, RenderTier};
use crate::streaming::spatial::{ChunkCoord, WorldBounds};

/// A visible chunk that survived culling
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TieredChunk {
    pub coord: ChunkCoord,
    /// Distance from the viewport center to the chunk center
    pub distance: f32,
    pub tier: RenderTier,
}

/// Classifies candidate chunks per frame.
///
/// Re-uses its output allocation across frames to avoid per-frame heap churn.
pub struct ChunkCuller {
    world: WorldBounds,
    chunk_size: i32,
    /// Surviving chunks after culling and sorting (reused each frame)
    tiered: Vec<TieredChunk>,
}

impl ChunkCuller {
    pub fn new(world: WorldBounds, chunk_size: i32) -> Self {
        Self {
            world,
            chunk_size: chunk_size.max(1),
            tiered: Vec::new(),
        }
    }

    /// Center of the in-world part of a chunk; edge chunks are clipped
    pub fn chunk_center(&self, coord: ChunkCoord) -> Option<Vec2> {
        let extent = self.world.chunk_extent(coord, self.chunk_size)?;
        Some(Vec2::new(
            extent.min_x as f32 + extent.width() as f32 * 0.5,
            extent.min_y as f32 + extent.height() as f32 * 0.5,
        ))
    }

    /// Cull chunks beyond the cull distance and sort the rest front-to-back.
    ///
    /// Returns the surviving chunks (valid until the next call) and the number
    /// culled. Chunks outside the world are dropped without counting.
    pub fn cull_and_sort(
        &mut self,
        candidates: impl IntoIterator<Item = ChunkCoord>,
        center: Vec2,
        lod: &LodConfig,
    ) -> (&[TieredChunk], usize) {
        self.tiered.clear();
        let mut culled = 0;

        for coord in candidates {
            let Some(chunk_center) = self.chunk_center(coord) else {
                continue;
            };
            let distance = center.distance(chunk_center);
            match lod.tier_for_distance(distance) {
                Some(tier) => self.tiered.push(TieredChunk { coord, distance, tier }),
                None => culled += 1,
            }
        }

        self.tiered.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.coord.cmp(&b.coord))
        });

        (&self.tiered, culled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_center_clipped() {
        let culler = ChunkCuller::new(WorldBounds::new(250, 100), 100);
        assert_eq!(culler.chunk_center(ChunkCoord::new(0, 0)), Some(Vec2::new(50.0, 50.0)));
        assert_eq!(culler.chunk_center(ChunkCoord::new(2, 0)), Some(Vec2::new(225.0, 50.0)));
        assert_eq!(culler.chunk_center(ChunkCoord::new(3, 0)), None);
    }

    #[test]
    fn test_tiers_at_known_distances() {
        let mut culler = ChunkCuller::new(WorldBounds::new(10000, 3000), 100);
        let center = Vec2::new(500.0, 500.0);
        let lod = LodConfig::default();

        // Chunk centers at x = 550, 850, 1250, 1750 (y = 550)
        let coords = [5, 8, 12, 17].map(|x| ChunkCoord::new(x, 5));
        let (tiered, culled) = culler.cull_and_sort(coords, center, &lod);

        assert_eq!(culled, 1);
        let tiers: Vec<_> = tiered.iter().map(|t| (t.coord.x, t.tier)).collect();
        assert_eq!(
            tiers,
            vec![(5, RenderTier::High), (8, RenderTier::Medium), (12, RenderTier::Low)]
        );
    }

    #[test]
    fn test_sorted_front_to_back() {
        let mut culler = ChunkCuller::new(WorldBounds::new(1000, 1000), 100);
        let coords = [ChunkCoord::new(4, 0), ChunkCoord::new(0, 0), ChunkCoord::new(2, 0)];
        let (tiered, _) = culler.cull_and_sort(coords, Vec2::ZERO, &LodConfig::default());

        let order: Vec<_> = tiered.iter().map(|t| t.coord.x).collect();
        assert_eq!(order, vec![0, 2, 4]);
        assert!(tiered.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_out_of_world_dropped() {
        let mut culler = ChunkCuller::new(WorldBounds::new(100, 100), 100);
        let (tiered, culled) = culler.cull_and_sort([ChunkCoord::new(-1, 0)], Vec2::ZERO, &LodConfig::default());
        assert!(tiered.is_empty());
        assert_eq!(culled, 0);
    }
}
