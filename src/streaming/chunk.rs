//! Chunks: fixed-size rectangular blocks of generated tiles

use crate::streaming::spatial::{ChunkCoord, TileBounds};
use crate::terrain::{GenerationError, Tile, TileSource};

/// A fully generated block of tiles.
///
/// Chunks are immutable once built and shared behind `Arc` between the
/// store, the renderer and query callers.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
    /// Row-major, `height` rows of `width` tiles
    tiles: Vec<Tile>,
}

impl Chunk {
    /// Generate every tile inside `extent`. Either the whole chunk is built or
    /// the first generator error is returned.
    pub fn generate(
        coord: ChunkCoord,
        extent: TileBounds,
        source: &dyn TileSource,
    ) -> Result<Self, GenerationError> {
        let width = extent.width();
        let height = extent.height();
        let mut tiles = Vec::with_capacity((width * height).max(0) as usize);

        for y in extent.min_y..=extent.max_y {
            for x in extent.min_x..=extent.max_x {
                tiles.push(source.generate(x, y)?);
            }
        }

        Ok(Self {
            coord,
            origin_x: extent.min_x,
            origin_y: extent.min_y,
            width,
            height,
            tiles,
        })
    }

    /// Tile rectangle covered by this chunk
    pub fn bounds(&self) -> TileBounds {
        TileBounds::new(
            self.origin_x,
            self.origin_y,
            self.origin_x + self.width - 1,
            self.origin_y + self.height - 1,
        )
    }

    /// Center of the covered rectangle in world units
    pub fn center(&self) -> (f32, f32) {
        (
            self.origin_x as f32 + self.width as f32 * 0.5,
            self.origin_y as f32 + self.height as f32 * 0.5,
        )
    }

    /// Tile by local (in-chunk) coordinates
    pub fn local(&self, lx: i32, ly: i32) -> Option<&Tile> {
        if lx < 0 || ly < 0 || lx >= self.width || ly >= self.height {
            return None;
        }
        self.tiles.get((ly * self.width + lx) as usize)
    }

    /// Tile by world coordinates
    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.local(x - self.origin_x, y - self.origin_y)
    }

    /// All tiles, row-major
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles inside an inclusive world rectangle
    pub fn tiles_in<'a>(&'a self, bounds: &'a TileBounds) -> impl Iterator<Item = &'a Tile> + 'a {
        self.tiles.iter().filter(move |t| bounds.contains(t.x, t.y))
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Rough heap + inline footprint, used for memory stats
    pub fn memory_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.tiles.capacity() * std::mem::size_of::<Tile>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{Terrain, TerrainGenerator};

    struct Flat;

    impl TileSource for Flat {
        fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
            Ok(Tile::new(x, y, Terrain::Plains))
        }
    }

    struct FailAt(i32, i32);

    impl TileSource for FailAt {
        fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
            if (x, y) == (self.0, self.1) {
                return Err(GenerationError::Source { x, y, reason: "boom".into() });
            }
            Ok(Tile::new(x, y, Terrain::Plains))
        }
    }

    #[test]
    fn test_generate_fills_extent() {
        let chunk = Chunk::generate(ChunkCoord::new(1, 2), TileBounds::new(10, 20, 19, 29), &Flat).unwrap();
        assert_eq!(chunk.tile_count(), 100);
        assert_eq!(chunk.tile(15, 25).map(|t| (t.x, t.y)), Some((15, 25)));
        assert_eq!(chunk.local(0, 0).map(|t| (t.x, t.y)), Some((10, 20)));
        assert!(chunk.tile(9, 25).is_none());
        assert!(chunk.tile(20, 25).is_none());
    }

    #[test]
    fn test_generate_is_all_or_nothing() {
        let result = Chunk::generate(ChunkCoord::new(0, 0), TileBounds::new(0, 0, 9, 9), &FailAt(4, 4));
        assert!(matches!(result, Err(GenerationError::Source { x: 4, y: 4, .. })));
    }

    #[test]
    fn test_clipped_chunk() {
        let chunk = Chunk::generate(ChunkCoord::new(2, 0), TileBounds::new(200, 0, 249, 9), &Flat).unwrap();
        assert_eq!((chunk.width, chunk.height), (50, 10));
        assert_eq!(chunk.center(), (225.0, 5.0));
        assert_eq!(chunk.bounds(), TileBounds::new(200, 0, 249, 9));
    }

    #[test]
    fn test_tiles_in_region() {
        let chunk = Chunk::generate(ChunkCoord::new(0, 0), TileBounds::new(0, 0, 9, 9), &Flat).unwrap();
        let region = TileBounds::new(2, 3, 4, 5);
        assert_eq!(chunk.tiles_in(&region).count(), 9);
    }

    #[test]
    fn test_matches_direct_generation() {
        let generator = TerrainGenerator::with_seed(3);
        let chunk = Chunk::generate(ChunkCoord::new(0, 0), TileBounds::new(0, 0, 15, 15), &generator).unwrap();
        assert_eq!(chunk.tile(7, 11), Some(&generator.generate(7, 11).unwrap()));
    }
}
