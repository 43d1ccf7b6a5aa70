//! LRU cache for resident chunks
//!
//! Tracks resident chunks together with their access recency. The cache
//! itself never evicts on insert; callers decide when to run an eviction
//! pass and which chunks are protected from it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::streaming::chunk::Chunk;
use crate::streaming::spatial::ChunkCoord;

/// A resident chunk plus its access bookkeeping
#[derive(Clone, Debug)]
pub struct CachedChunk {
    pub chunk: Arc<Chunk>,
    /// Wall-clock time of the last access, for expiry
    pub last_accessed: Instant,
    /// Monotonic access counter, for strict LRU ordering
    pub access_seq: u64,
}

/// Resident chunk map with recency tracking
pub struct ChunkCache {
    /// Map of chunk coordinates to resident chunks
    chunks: HashMap<ChunkCoord, CachedChunk>,
    /// Next access sequence number
    next_seq: u64,
    /// Running total of chunk memory
    bytes: usize,
}

impl ChunkCache {
    /// Create a new chunk cache sized for `capacity` chunks
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: HashMap::with_capacity(capacity + 1),
            next_seq: 0,
            bytes: 0,
        }
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Get a chunk by coordinate, marking it as most recently used
    pub fn get(&mut self, coord: ChunkCoord, now: Instant) -> Option<Arc<Chunk>> {
        let seq = self.bump();
        let entry = self.chunks.get_mut(&coord)?;
        entry.last_accessed = now;
        entry.access_seq = seq;
        Some(Arc::clone(&entry.chunk))
    }

    /// Look at an entry without touching it
    pub fn peek(&self, coord: ChunkCoord) -> Option<&CachedChunk> {
        self.chunks.get(&coord)
    }

    /// Insert a chunk as the most recently used entry.
    ///
    /// # Returns
    /// The replaced chunk if one was already resident for this coordinate
    pub fn insert(&mut self, chunk: Arc<Chunk>, now: Instant) -> Option<Arc<Chunk>> {
        let seq = self.bump();
        let coord = chunk.coord;
        self.bytes += chunk.memory_bytes();
        let replaced = self.chunks.insert(
            coord,
            CachedChunk {
                chunk,
                last_accessed: now,
                access_seq: seq,
            },
        );
        replaced.map(|old| {
            self.bytes = self.bytes.saturating_sub(old.chunk.memory_bytes());
            old.chunk
        })
    }

    /// Remove a chunk from the cache
    pub fn remove(&mut self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        let removed = self.chunks.remove(&coord)?;
        self.bytes = self.bytes.saturating_sub(removed.chunk.memory_bytes());
        Some(removed.chunk)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Get the number of chunks in the cache
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Estimated bytes held by resident chunks
    pub fn memory_bytes(&self) -> usize {
        self.bytes
    }

    /// Iterator over all resident coordinates
    pub fn coords(&self) -> impl Iterator<Item = &ChunkCoord> {
        self.chunks.keys()
    }

    /// Pick chunks to evict so that at most `target` remain.
    ///
    /// Protected chunks are never chosen. Entries idle longer than `expiry`
    /// go first, oldest first; the rest follow in LRU order. If the protected
    /// set alone exceeds `target`, fewer victims than needed are returned.
    pub fn select_victims(
        &self,
        target: usize,
        protected: &HashSet<ChunkCoord>,
        expiry: Duration,
        now: Instant,
    ) -> Vec<ChunkCoord> {
        let excess = self.chunks.len().saturating_sub(target);
        if excess == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<(bool, u64, ChunkCoord)> = self
            .chunks
            .iter()
            .filter(|(coord, _)| !protected.contains(coord))
            .map(|(coord, entry)| {
                let fresh = now.saturating_duration_since(entry.last_accessed) <= expiry;
                (fresh, entry.access_seq, *coord)
            })
            .collect();

        // Expired (fresh == false) sort before fresh, then oldest first
        candidates.sort_unstable();
        candidates.into_iter().take(excess).map(|(_, _, coord)| coord).collect()
    }

    /// Every unprotected chunk idle for longer than `expiry`, oldest first
    pub fn expired(&self, protected: &HashSet<ChunkCoord>, expiry: Duration, now: Instant) -> Vec<ChunkCoord> {
        let mut expired: Vec<(u64, ChunkCoord)> = self
            .chunks
            .iter()
            .filter(|(coord, entry)| {
                !protected.contains(coord) && now.saturating_duration_since(entry.last_accessed) > expiry
            })
            .map(|(coord, entry)| (entry.access_seq, *coord))
            .collect();
        expired.sort_unstable();
        expired.into_iter().map(|(_, coord)| coord).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::spatial::TileBounds;
    use crate::terrain::{GenerationError, Terrain, Tile, TileSource};

    struct Flat;

    impl TileSource for Flat {
        fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
            Ok(Tile::new(x, y, Terrain::Grassland))
        }
    }

    fn make_chunk(x: i32, y: i32) -> Arc<Chunk> {
        let extent = TileBounds::new(x * 4, y * 4, x * 4 + 3, y * 4 + 3);
        Arc::new(Chunk::generate(ChunkCoord::new(x, y), extent, &Flat).unwrap())
    }

    #[test]
    fn test_cache_new() {
        let cache = ChunkCache::new(10);
        assert_eq!(cache.len(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.memory_bytes(), 0);
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = ChunkCache::new(10);
        let now = Instant::now();
        cache.insert(make_chunk(1, 2), now);

        assert_eq!(cache.len(), 1);
        assert!(cache.contains(ChunkCoord::new(1, 2)));
        let chunk = cache.get(ChunkCoord::new(1, 2), now).unwrap();
        assert_eq!(chunk.coord, ChunkCoord::new(1, 2));
        assert!(cache.get(ChunkCoord::new(9, 9), now).is_none());
        assert!(cache.memory_bytes() > 0);
    }

    #[test]
    fn test_cache_insert_replace() {
        let mut cache = ChunkCache::new(10);
        let now = Instant::now();
        assert!(cache.insert(make_chunk(1, 2), now).is_none());
        let bytes = cache.memory_bytes();
        assert!(cache.insert(make_chunk(1, 2), now).is_some());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_bytes(), bytes);
    }

    #[test]
    fn test_cache_remove() {
        let mut cache = ChunkCache::new(10);
        cache.insert(make_chunk(1, 2), Instant::now());
        assert!(cache.remove(ChunkCoord::new(1, 2)).is_some());
        assert!(cache.remove(ChunkCoord::new(1, 2)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.memory_bytes(), 0);
    }

    #[test]
    fn test_select_victims_lru_order() {
        let mut cache = ChunkCache::new(10);
        let now = Instant::now();
        for i in 0..5 {
            cache.insert(make_chunk(i, 0), now);
        }
        // Touch chunk 0 so it becomes the most recent
        cache.get(ChunkCoord::new(0, 0), now);

        let victims = cache.select_victims(3, &HashSet::new(), Duration::from_secs(300), now);
        assert_eq!(victims, vec![ChunkCoord::new(1, 0), ChunkCoord::new(2, 0)]);
    }

    #[test]
    fn test_select_victims_skips_protected() {
        let mut cache = ChunkCache::new(10);
        let now = Instant::now();
        for i in 0..5 {
            cache.insert(make_chunk(i, 0), now);
        }
        let protected: HashSet<_> = [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)].into();

        let victims = cache.select_victims(2, &protected, Duration::ZERO, now);
        assert_eq!(
            victims,
            vec![ChunkCoord::new(2, 0), ChunkCoord::new(3, 0), ChunkCoord::new(4, 0)]
        );

        // Protected set larger than the target: only unprotected chunks go
        let victims = cache.select_victims(0, &protected, Duration::ZERO, now);
        assert_eq!(victims.len(), 3);
    }

    #[test]
    fn test_select_victims_prefers_expired() {
        let mut cache = ChunkCache::new(10);
        let start = Instant::now();
        let later = start + Duration::from_secs(600);

        cache.insert(make_chunk(0, 0), start);
        cache.insert(make_chunk(1, 0), start);
        cache.insert(make_chunk(2, 0), later);
        // Re-touch chunk 1 with an old timestamp but a newer sequence number
        cache.get(ChunkCoord::new(1, 0), start);

        let victims = cache.select_victims(1, &HashSet::new(), Duration::from_secs(300), later);
        assert_eq!(victims, vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]);
    }

    #[test]
    fn test_nothing_to_evict_under_target() {
        let mut cache = ChunkCache::new(10);
        cache.insert(make_chunk(0, 0), Instant::now());
        assert!(cache.select_victims(5, &HashSet::new(), Duration::ZERO, Instant::now()).is_empty());
    }

    #[test]
    fn test_expired() {
        let mut cache = ChunkCache::new(10);
        let start = Instant::now();
        cache.insert(make_chunk(0, 0), start);
        cache.insert(make_chunk(1, 0), start + Duration::from_secs(100));
        cache.insert(make_chunk(2, 0), start);

        let now = start + Duration::from_secs(301);
        let protected: HashSet<_> = [ChunkCoord::new(2, 0)].into();
        let expired = cache.expired(&protected, Duration::from_secs(300), now);
        assert_eq!(expired, vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn test_cache_coords_iterator() {
        let mut cache = ChunkCache::new(10);
        let now = Instant::now();
        cache.insert(make_chunk(1, 2), now);
        cache.insert(make_chunk(4, 5), now);

        let coords: Vec<_> = cache.coords().copied().collect();
        assert_eq!(coords.len(), 2);
        assert!(coords.contains(&ChunkCoord::new(4, 5)));
    }
}
