//! Residency budget for the chunk store
//!
//! Holds the streaming configuration and answers the questions the store asks
//! before and after every load: is the cache over capacity, how far down
//! should an eviction pass go, and how much pressure is the working set under.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default chunk edge length in tiles
pub const DEFAULT_CHUNK_SIZE: i32 = 100;
/// Default resident chunk limit
pub const DEFAULT_MAX_LOADED_CHUNKS: usize = 50;
/// Default idle time before a chunk counts as expired
pub const DEFAULT_CACHE_EXPIRY_SECS: u64 = 300;
/// Default slack left below capacity after an eviction pass
pub const DEFAULT_EVICTION_HEADROOM: usize = 10;

/// Streaming configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunk edge length in tiles
    pub chunk_size: i32,
    /// Resident chunk limit
    pub max_loaded_chunks: usize,
    /// Idle seconds before a chunk is considered expired
    pub cache_expiry_secs: u64,
    /// An eviction pass evicts down to `max_loaded_chunks - eviction_headroom`
    pub eviction_headroom: usize,
    /// Square radius (in chunks) preloaded around the start position
    pub preload_radius: i32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_loaded_chunks: DEFAULT_MAX_LOADED_CHUNKS,
            cache_expiry_secs: DEFAULT_CACHE_EXPIRY_SECS,
            eviction_headroom: DEFAULT_EVICTION_HEADROOM,
            preload_radius: 1,
        }
    }
}

impl StreamingConfig {
    pub fn cache_expiry(&self) -> Duration {
        Duration::from_secs(self.cache_expiry_secs)
    }
}

/// Capacity budget for resident chunks
///
/// Eviction is triggered only once the resident count exceeds the limit, and
/// then runs down to the limit minus the headroom so that a burst of loads
/// does not trigger a pass per chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBudget {
    /// Maximum resident chunks
    max_chunks: usize,
    /// Slack below `max_chunks` left after an eviction pass
    headroom: usize,
    /// Idle time after which a chunk is an early eviction candidate
    expiry: Duration,
}

impl ChunkBudget {
    /// Create a new chunk budget
    ///
    /// # Arguments
    /// * `max_chunks` - Resident chunk limit
    /// * `headroom` - Slack left after an eviction pass
    /// * `expiry` - Idle time before a chunk counts as expired
    pub fn new(max_chunks: usize, headroom: usize, expiry: Duration) -> Self {
        Self {
            max_chunks,
            headroom: headroom.min(max_chunks),
            expiry,
        }
    }

    pub fn from_config(config: &StreamingConfig) -> Self {
        Self::new(
            config.max_loaded_chunks,
            config.eviction_headroom,
            config.cache_expiry(),
        )
    }

    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Check if an eviction pass should run
    pub fn should_evict(&self, resident: usize) -> bool {
        resident > self.max_chunks
    }

    /// Resident count an eviction pass aims for
    pub fn eviction_target(&self) -> usize {
        self.max_chunks.saturating_sub(self.headroom)
    }

    /// Chunks that can still be loaded before the limit is reached
    pub fn available(&self, resident: usize) -> usize {
        self.max_chunks.saturating_sub(resident)
    }

    /// Occupancy ratio (0.0 to 1.0+)
    ///
    /// Values above 1.0 mean the cache is over capacity.
    pub fn pressure(&self, resident: usize) -> f32 {
        if self.max_chunks == 0 {
            return 0.0;
        }
        resident as f32 / self.max_chunks as f32
    }
}

impl Default for ChunkBudget {
    fn default() -> Self {
        Self::from_config(&StreamingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streaming_config_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.max_loaded_chunks, 50);
        assert_eq!(config.cache_expiry(), Duration::from_secs(300));
        assert_eq!(config.eviction_headroom, 10);
    }

    #[test]
    fn test_budget_new() {
        let budget = ChunkBudget::default();
        assert_eq!(budget.max_chunks(), 50);
        assert_eq!(budget.eviction_target(), 40);
        assert_eq!(budget.expiry(), Duration::from_secs(300));
    }

    #[test]
    fn test_should_evict_only_above_limit() {
        let budget = ChunkBudget::new(10, 2, Duration::ZERO);
        assert!(!budget.should_evict(9));
        assert!(!budget.should_evict(10));
        assert!(budget.should_evict(11));
    }

    #[test]
    fn test_headroom_saturates() {
        let budget = ChunkBudget::new(5, 10, Duration::ZERO);
        assert_eq!(budget.eviction_target(), 0);
        let budget = ChunkBudget::new(5, 0, Duration::ZERO);
        assert_eq!(budget.eviction_target(), 5);
    }

    #[test]
    fn test_budget_pressure() {
        let budget = ChunkBudget::new(10, 0, Duration::ZERO);
        assert_eq!(budget.pressure(0), 0.0);
        assert_eq!(budget.pressure(5), 0.5);
        assert!(budget.pressure(12) > 1.0);
        assert_eq!(budget.available(4), 6);
        assert_eq!(budget.available(14), 0);

        let zero = ChunkBudget::new(0, 0, Duration::ZERO);
        assert_eq!(zero.pressure(3), 0.0);
    }

    #[test]
    fn test_config_serde_fills_defaults() {
        let config: StreamingConfig = serde_json::from_str(r#"{"max_loaded_chunks": 8}"#).unwrap();
        assert_eq!(config.max_loaded_chunks, 8);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
