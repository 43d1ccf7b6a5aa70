//! World ↔ chunk coordinate math
//!
//! Everything here is pure: no state, no I/O. Tile coordinates are integer
//! cell indices, chunk membership is floor division by the chunk size.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Integer coordinate identifying a chunk in the world grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space origin (minimum corner) of this chunk
    pub fn origin(&self, chunk_size: i32) -> (i32, i32) {
        (self.x * chunk_size, self.y * chunk_size)
    }

    /// World-space center of the unclipped chunk square
    pub fn center(&self, chunk_size: i32) -> (f32, f32) {
        let half = chunk_size as f32 * 0.5;
        (
            self.x as f32 * chunk_size as f32 + half,
            self.y as f32 * chunk_size as f32 + half,
        )
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive integer rectangle of tiles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileBounds {
    /// Build from two corners in any order
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    /// Grow by `margin` tiles on every side
    pub fn expand(&self, margin: i32) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Intersect with the world; `None` if nothing remains
    pub fn clamp_to(&self, world: &WorldBounds) -> Option<Self> {
        let clamped = Self {
            min_x: self.min_x.max(0),
            min_y: self.min_y.max(0),
            max_x: self.max_x.min(world.width - 1),
            max_y: self.max_y.min(world.height - 1),
        };
        (clamped.min_x <= clamped.max_x && clamped.min_y <= clamped.max_y).then_some(clamped)
    }
}

/// Size of the world in tiles; valid tiles are `[0, width) × [0, height)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: i32,
    pub height: i32,
}

impl WorldBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Number of chunk columns and rows covering the world
    pub fn chunk_grid(&self, chunk_size: i32) -> (i32, i32) {
        (
            (self.width + chunk_size - 1) / chunk_size,
            (self.height + chunk_size - 1) / chunk_size,
        )
    }

    /// Whether a chunk holds at least one in-world tile
    pub fn contains_chunk(&self, coord: ChunkCoord, chunk_size: i32) -> bool {
        let (cols, rows) = self.chunk_grid(chunk_size);
        coord.x >= 0 && coord.y >= 0 && coord.x < cols && coord.y < rows
    }

    /// The in-world tile rectangle of a chunk, clipped at the far edges
    pub fn chunk_extent(&self, coord: ChunkCoord, chunk_size: i32) -> Option<TileBounds> {
        if !self.contains_chunk(coord, chunk_size) {
            return None;
        }
        let (ox, oy) = coord.origin(chunk_size);
        Some(TileBounds {
            min_x: ox,
            min_y: oy,
            max_x: (ox + chunk_size).min(self.width) - 1,
            max_y: (oy + chunk_size).min(self.height) - 1,
        })
    }

    pub fn as_tile_bounds(&self) -> TileBounds {
        TileBounds::new(0, 0, self.width - 1, self.height - 1)
    }
}

/// Chunk owning the tile at (x, y). Floors toward negative infinity.
pub fn world_to_chunk(x: i32, y: i32, chunk_size: i32) -> ChunkCoord {
    ChunkCoord::new(x.div_euclid(chunk_size), y.div_euclid(chunk_size))
}

/// Chunk containing a fractional world position
pub fn world_pos_to_chunk(x: f32, y: f32, chunk_size: i32) -> ChunkCoord {
    let size = chunk_size as f32;
    ChunkCoord::new((x / size).floor() as i32, (y / size).floor() as i32)
}

/// Every chunk touched by an inclusive tile rectangle
pub fn chunks_overlapping(bounds: &TileBounds, chunk_size: i32) -> BTreeSet<ChunkCoord> {
    let lo = world_to_chunk(bounds.min_x, bounds.min_y, chunk_size);
    let hi = world_to_chunk(bounds.max_x, bounds.max_y, chunk_size);

    let mut result = BTreeSet::new();
    for cy in lo.y..=hi.y {
        for cx in lo.x..=hi.x {
            result.insert(ChunkCoord::new(cx, cy));
        }
    }
    result
}

/// All chunks within a square radius (in chunks) of a center chunk
pub fn chunks_around(center: ChunkCoord, radius: i32) -> BTreeSet<ChunkCoord> {
    let mut result = BTreeSet::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            result.insert(ChunkCoord::new(center.x + dx, center.y + dy));
        }
    }
    result
}
