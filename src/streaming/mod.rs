//! Chunked world streaming: load-or-generate, dedupe, and bounded residency

pub mod spatial;
pub mod chunk;
pub mod cache;
pub mod chunk_loader;
pub mod budget;
pub mod lod;
pub mod priority;
pub mod store;

use thiserror::Error;

pub use spatial::{
    ChunkCoord, TileBounds, WorldBounds,
    world_to_chunk, world_pos_to_chunk, chunks_overlapping, chunks_around,
};
pub use chunk::Chunk;
pub use cache::ChunkCache;
pub use chunk_loader::{LoadOutcome, LoadTicket, LoadWaiter, PendingLoads};
pub use budget::{ChunkBudget, StreamingConfig};
pub use lod::{LodConfig, RenderTier, tier_from_distance, CULL_DISTANCE, HIGH_DISTANCE, MEDIUM_DISTANCE};
pub use priority::{ChunkPriority, ChunkPriorityQueue};
pub use store::{ChunkStore, StoreStats};

/// Streaming failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StreamError {
    #[error("tile ({x}, {y}) is outside the world")]
    OutOfBounds { x: i32, y: i32 },

    #[error("chunk {0} is outside the world")]
    ChunkOutOfBounds(ChunkCoord),

    #[error("failed to generate chunk {coord}: {reason}")]
    Generation { coord: ChunkCoord, reason: String },

    #[error("chunk load task failed: {0}")]
    TaskFailed(String),
}

impl StreamError {
    /// Out-of-world lookups are expected outcomes, not failures
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, StreamError::OutOfBounds { .. } | StreamError::ChunkOutOfBounds(_))
    }
}
