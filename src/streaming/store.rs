//! Chunk store: load-or-generate with per-chunk dedup and bounded residency
//!
//! The store owns the resident chunk map and the set of in-flight loads
//! behind one mutex. The lock is only ever held for short, non-async
//! bookkeeping; tile generation runs on the blocking pool with the lock
//! released, and completion wakes every caller waiting on that chunk.

use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::streaming::budget::{ChunkBudget, StreamingConfig};
use crate::streaming::cache::ChunkCache;
use crate::streaming::chunk::Chunk;
use crate::streaming::chunk_loader::{LoadOutcome, PendingLoads};
use crate::streaming::spatial::{
    chunks_around, chunks_overlapping, world_pos_to_chunk, world_to_chunk, ChunkCoord, TileBounds, WorldBounds,
};
use crate::streaming::StreamError;
use crate::terrain::{Tile, TileSource};

/// Store counters and occupancy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Chunks currently resident
    pub resident: usize,
    /// Chunks currently being generated
    pub pending: usize,
    /// Chunks protected from eviction
    pub protected: usize,
    /// Successful chunk generations
    pub generations: u64,
    /// Generations that failed or panicked
    pub failed_generations: u64,
    /// Chunks evicted for capacity or expiry
    pub evictions: u64,
    /// Loads served from the resident map
    pub hits: u64,
    /// Loads that started a generation
    pub misses: u64,
    /// Loads that joined a generation already in flight
    pub joins: u64,
    /// Rough memory held by resident chunks
    pub estimated_bytes: usize,
}

struct StoreState {
    cache: ChunkCache,
    pending: PendingLoads,
    /// Chunks the current viewport needs; never evicted
    required: HashSet<ChunkCoord>,
    stats: StoreStats,
}

struct Inner {
    world: WorldBounds,
    chunk_size: i32,
    budget: ChunkBudget,
    source: Arc<dyn TileSource>,
    state: Mutex<StoreState>,
}

/// Shared handle to the chunk store. Cloning is cheap and every clone sees
/// the same resident set.
#[derive(Clone)]
pub struct ChunkStore {
    inner: Arc<Inner>,
}

impl ChunkStore {
    /// Create a store over `world`, generating tiles with `source`
    pub fn new(world: WorldBounds, config: &StreamingConfig, source: Arc<dyn TileSource>) -> Self {
        let budget = ChunkBudget::from_config(config);
        Self {
            inner: Arc::new(Inner {
                world,
                chunk_size: config.chunk_size.max(1),
                budget,
                source,
                state: Mutex::new(StoreState {
                    cache: ChunkCache::new(budget.max_chunks()),
                    pending: PendingLoads::new(),
                    required: HashSet::new(),
                    stats: StoreStats::default(),
                }),
            }),
        }
    }

    pub fn world(&self) -> WorldBounds {
        self.inner.world
    }

    pub fn chunk_size(&self) -> i32 {
        self.inner.chunk_size
    }

    pub fn budget(&self) -> &ChunkBudget {
        &self.inner.budget
    }

    /// Chunk owning the tile at (x, y)
    pub fn chunk_for_tile(&self, x: i32, y: i32) -> ChunkCoord {
        world_to_chunk(x, y, self.inner.chunk_size)
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        // Bookkeeping never leaves the state half-updated, so a poisoned lock is still usable
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn runtime() -> Result<Handle, StreamError> {
        Handle::try_current().map_err(|e| StreamError::TaskFailed(e.to_string()))
    }

    /// Fetch a single tile, loading its chunk if needed
    pub async fn get_tile(&self, x: i32, y: i32) -> Result<Tile, StreamError> {
        if !self.inner.world.contains(x, y) {
            return Err(StreamError::OutOfBounds { x, y });
        }

        let chunk = self.load_chunk(self.chunk_for_tile(x, y)).await?;
        chunk.tile(x, y).cloned().ok_or(StreamError::OutOfBounds { x, y })
    }

    /// Return a resident chunk, join an in-flight load, or start a new one
    pub async fn load_chunk(&self, coord: ChunkCoord) -> Result<Arc<Chunk>, StreamError> {
        let extent = self
            .inner
            .world
            .chunk_extent(coord, self.inner.chunk_size)
            .ok_or(StreamError::ChunkOutOfBounds(coord))?;

        let ticket = {
            let mut state = self.state();
            if let Some(chunk) = state.cache.get(coord, Instant::now()) {
                state.stats.hits += 1;
                return Ok(chunk);
            }
            // Resolve the runtime before registering so a failure leaves nothing pending
            let handle = Self::runtime()?;
            let ticket = state.pending.begin(coord);
            if ticket.is_start() {
                state.stats.misses += 1;
                self.spawn_generation(&handle, coord, extent);
            } else {
                state.stats.joins += 1;
            }
            ticket
        };

        ticket.into_waiter().wait().await
    }

    /// Schedule a load without waiting for it.
    ///
    /// Returns `true` if a new generation was started, `false` if the chunk is
    /// outside the world, already resident or already pending.
    pub fn request(&self, coord: ChunkCoord) -> bool {
        let Some(extent) = self.inner.world.chunk_extent(coord, self.inner.chunk_size) else {
            return false;
        };

        let mut state = self.state();
        if state.cache.contains(coord) || state.pending.is_pending(coord) {
            return false;
        }
        let handle = match Self::runtime() {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("Cannot schedule chunk {}: {}", coord, e);
                return false;
            }
        };

        state.pending.begin(coord);
        state.stats.misses += 1;
        self.spawn_generation(&handle, coord, extent);
        true
    }

    /// Non-suspending lookup; touches the chunk if resident
    pub fn resident(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.state().cache.get(coord, Instant::now())
    }

    /// Whether a chunk is resident, without touching it
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.state().cache.contains(coord)
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.state().pending.is_pending(coord)
    }

    /// Sorted list of resident chunk coordinates
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.state().cache.coords().copied().collect();
        coords.sort_unstable();
        coords
    }

    fn spawn_generation(&self, handle: &Handle, coord: ChunkCoord, extent: TileBounds) {
        let store = self.clone();
        let source = Arc::clone(&self.inner.source);

        // Detached: the load finishes even if every waiter goes away
        handle.spawn(async move {
            let generated = tokio::task::spawn_blocking(move || Chunk::generate(coord, extent, source.as_ref())).await;

            let outcome = match generated {
                Ok(Ok(chunk)) => Ok(Arc::new(chunk)),
                Ok(Err(e)) => Err(StreamError::Generation {
                    coord,
                    reason: e.to_string(),
                }),
                Err(e) => Err(StreamError::Generation {
                    coord,
                    reason: format!("generator panicked: {}", e),
                }),
            };
            store.finish_load(coord, outcome);
        });
    }

    fn finish_load(&self, coord: ChunkCoord, outcome: LoadOutcome) {
        let mut state = self.state();
        match &outcome {
            Ok(chunk) => {
                state.stats.generations += 1;
                state.cache.insert(Arc::clone(chunk), Instant::now());
                log::debug!("Loaded chunk {} ({} tiles)", coord, chunk.tile_count());
            }
            Err(e) => {
                state.stats.failed_generations += 1;
                log::error!("{}", e);
            }
        }

        state.pending.complete(coord, outcome);
        self.evict_locked(&mut state);
    }

    /// Load several chunks concurrently.
    ///
    /// Every load runs to completion; the first error seen is returned.
    pub async fn load_chunks(
        &self,
        coords: impl IntoIterator<Item = ChunkCoord>,
    ) -> Result<Vec<Arc<Chunk>>, StreamError> {
        let handle = Self::runtime()?;
        let mut tasks = JoinSet::new();
        for coord in coords {
            let store = self.clone();
            tasks.spawn_on(async move { store.load_chunk(coord).await }, &handle);
        }

        let mut chunks = Vec::with_capacity(tasks.len());
        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(chunk)) => chunks.push(chunk),
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    first_error.get_or_insert(StreamError::TaskFailed(e.to_string()));
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(chunks),
        }
    }

    /// All tiles in an inclusive rectangle, clamped to the world, sorted by
    /// row then column
    pub async fn get_tiles_in_region(
        &self,
        min_x: i32,
        min_y: i32,
        max_x: i32,
        max_y: i32,
    ) -> Result<Vec<Tile>, StreamError> {
        let Some(bounds) = TileBounds::new(min_x, min_y, max_x, max_y).clamp_to(&self.inner.world) else {
            return Ok(Vec::new());
        };

        let chunks = self
            .load_chunks(chunks_overlapping(&bounds, self.inner.chunk_size))
            .await?;

        let mut tiles: Vec<Tile> = chunks
            .iter()
            .flat_map(|chunk| chunk.tiles_in(&bounds).cloned())
            .collect();
        tiles.sort_unstable_by_key(|t| (t.y, t.x));
        Ok(tiles)
    }

    /// Load the square of chunks within `radius` chunks of a world position.
    ///
    /// # Returns
    /// The number of in-world chunks now loaded around the position
    pub async fn preload(&self, center_x: f32, center_y: f32, radius: i32) -> Result<usize, StreamError> {
        let center = world_pos_to_chunk(center_x, center_y, self.inner.chunk_size);
        self.preload_chunks(&chunks_around(center, radius.max(0))).await
    }

    /// Load every in-world chunk of `coords`, returning how many were loaded
    pub async fn preload_chunks(&self, coords: &BTreeSet<ChunkCoord>) -> Result<usize, StreamError> {
        let world = self.inner.world;
        let chunk_size = self.inner.chunk_size;
        let in_world = coords
            .iter()
            .copied()
            .filter(|c| world.contains_chunk(*c, chunk_size));

        let loaded = self.load_chunks(in_world).await?;
        log::debug!("Preloaded {} chunks", loaded.len());
        Ok(loaded.len())
    }

    /// Replace the set of chunks protected from eviction
    pub fn set_required(&self, coords: impl IntoIterator<Item = ChunkCoord>) {
        let mut state = self.state();
        state.required = coords.into_iter().collect();
        if state.required.len() > self.inner.budget.max_chunks() {
            log::warn!(
                "Required set ({} chunks) exceeds cache capacity ({})",
                state.required.len(),
                self.inner.budget.max_chunks()
            );
        }
    }

    /// Run a capacity eviction pass if the store is over its limit
    ///
    /// # Returns
    /// Number of chunks evicted
    pub fn evict_if_needed(&self) -> usize {
        let mut state = self.state();
        self.evict_locked(&mut state)
    }

    fn evict_locked(&self, state: &mut StoreState) -> usize {
        let budget = &self.inner.budget;
        if !budget.should_evict(state.cache.len()) {
            return 0;
        }

        let victims = state.cache.select_victims(
            budget.eviction_target(),
            &state.required,
            budget.expiry(),
            Instant::now(),
        );
        for coord in &victims {
            state.cache.remove(*coord);
        }
        state.stats.evictions += victims.len() as u64;

        log::debug!("Evicted {} chunks, {} resident", victims.len(), state.cache.len());
        if state.cache.len() > budget.max_chunks() {
            log::warn!(
                "Chunk cache over capacity: {} resident, limit {}, {} protected",
                state.cache.len(),
                budget.max_chunks(),
                state.required.len()
            );
        }
        victims.len()
    }

    /// Evict every unprotected chunk idle for longer than the cache expiry
    pub fn evict_expired(&self) -> usize {
        let mut state = self.state();
        let expired = state
            .cache
            .expired(&state.required, self.inner.budget.expiry(), Instant::now());
        for coord in &expired {
            state.cache.remove(*coord);
        }
        state.stats.evictions += expired.len() as u64;

        if !expired.is_empty() {
            log::debug!("Expired {} idle chunks", expired.len());
        }
        expired.len()
    }

    /// Snapshot of counters and occupancy
    pub fn stats(&self) -> StoreStats {
        let state = self.state();
        StoreStats {
            resident: state.cache.len(),
            pending: state.pending.len(),
            protected: state.required.len(),
            estimated_bytes: state.cache.memory_bytes(),
            ..state.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{GenerationError, Terrain, TerrainGenerator};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts tile calls and can be switched into a failing or panicking mode
    #[derive(Default)]
    struct TestSource {
        calls: AtomicUsize,
        fail: AtomicBool,
        panic: AtomicBool,
    }

    impl TileSource for TestSource {
        fn generate(&self, x: i32, y: i32) -> Result<Tile, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.panic.load(Ordering::SeqCst) {
                panic!("generator exploded at ({}, {})", x, y);
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(GenerationError::Source {
                    x,
                    y,
                    reason: "disabled".into(),
                });
            }
            Ok(Tile::new(x, y, Terrain::Plains))
        }
    }

    fn config(max_loaded_chunks: usize, headroom: usize, expiry_secs: u64) -> StreamingConfig {
        StreamingConfig {
            chunk_size: 10,
            max_loaded_chunks,
            cache_expiry_secs: expiry_secs,
            eviction_headroom: headroom,
            preload_radius: 1,
        }
    }

    fn make_store(config: &StreamingConfig) -> (ChunkStore, Arc<TestSource>) {
        let source = Arc::new(TestSource::default());
        let store = ChunkStore::new(WorldBounds::new(100, 100), config, source.clone());
        (store, source)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_loads_generate_once() {
        let (store, source) = make_store(&config(50, 10, 300));
        let coord = ChunkCoord::new(3, 4);

        let mut tasks = JoinSet::new();
        for _ in 0..16 {
            let store = store.clone();
            tasks.spawn(async move { store.load_chunk(coord).await.unwrap() });
        }

        let mut chunks = Vec::new();
        while let Some(chunk) = tasks.join_next().await {
            chunks.push(chunk.unwrap());
        }

        assert!(chunks.iter().all(|c| Arc::ptr_eq(c, &chunks[0])));
        let stats = store.stats();
        assert_eq!(stats.generations, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits + stats.joins, 15);
        assert_eq!(source.calls.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_second_load_is_cache_hit() {
        let (store, source) = make_store(&config(50, 10, 300));
        let coord = ChunkCoord::new(1, 1);

        let first = store.load_chunk(coord).await.unwrap();
        let second = store.load_chunk(coord).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.stats().generations, 1);
        assert_eq!(store.stats().hits, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_get_tile_bounds() {
        let (store, _) = make_store(&config(50, 10, 300));

        assert_eq!(
            store.get_tile(-1, 0).await,
            Err(StreamError::OutOfBounds { x: -1, y: 0 })
        );
        assert_eq!(
            store.get_tile(100, 0).await,
            Err(StreamError::OutOfBounds { x: 100, y: 0 })
        );
        assert_eq!(
            store.load_chunk(ChunkCoord::new(10, 0)).await,
            Err(StreamError::ChunkOutOfBounds(ChunkCoord::new(10, 0)))
        );
        // Nothing was generated for rejected lookups
        assert_eq!(store.stats().misses, 0);

        let tile = store.get_tile(99, 99).await.unwrap();
        assert_eq!((tile.x, tile.y), (99, 99));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tiles_match_generator() {
        let generator = Arc::new(TerrainGenerator::with_seed(77));
        let store = ChunkStore::new(WorldBounds::new(500, 500), &config(50, 10, 300), generator.clone());

        for (x, y) in [(0, 0), (123, 321), (499, 499), (250, 7)] {
            assert_eq!(store.get_tile(x, y).await.unwrap(), generator.generate(x, y).unwrap());
        }
    }

    #[tokio::test]
    async fn test_region_is_exact() {
        let (store, _) = make_store(&config(50, 10, 300));

        let tiles = store.get_tiles_in_region(10, 10, 20, 20).await.unwrap();
        assert_eq!(tiles.len(), 121);
        assert!(tiles.iter().all(|t| (10..=20).contains(&t.x) && (10..=20).contains(&t.y)));
        assert_eq!((tiles[0].x, tiles[0].y), (10, 10));
        assert_eq!((tiles[1].x, tiles[1].y), (11, 10));
        assert_eq!((tiles[120].x, tiles[120].y), (20, 20));
        // (10..=20) spans two chunk columns and two chunk rows
        assert_eq!(store.stats().generations, 4);
    }

    #[tokio::test]
    async fn test_region_clamped_to_world() {
        let (store, _) = make_store(&config(50, 10, 300));

        assert_eq!(store.get_tiles_in_region(-5, -5, 2, 2).await.unwrap().len(), 9);
        assert!(store.get_tiles_in_region(200, 200, 300, 300).await.unwrap().is_empty());
        // Corners given in reverse order
        assert_eq!(store.get_tiles_in_region(2, 2, 0, 0).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_capacity_bound_and_lru_victim() {
        let (store, _) = make_store(&config(5, 0, 3600));

        for x in 0..5 {
            store.load_chunk(ChunkCoord::new(x, 0)).await.unwrap();
        }
        // Touch chunk 0 so chunk 1 becomes least recently used
        store.load_chunk(ChunkCoord::new(0, 0)).await.unwrap();
        store.load_chunk(ChunkCoord::new(5, 0)).await.unwrap();

        assert_eq!(store.stats().resident, 5);
        assert!(store.is_resident(ChunkCoord::new(0, 0)));
        assert!(!store.is_resident(ChunkCoord::new(1, 0)));

        for x in 6..10 {
            store.load_chunk(ChunkCoord::new(x, 0)).await.unwrap();
            assert!(store.stats().resident <= 5);
        }
        assert_eq!(store.stats().evictions, 5);
    }

    #[tokio::test]
    async fn test_eviction_headroom() {
        let (store, _) = make_store(&config(10, 3, 3600));

        for i in 0..11 {
            store.load_chunk(ChunkCoord::new(i % 10, i / 10)).await.unwrap();
        }
        let stats = store.stats();
        assert_eq!(stats.resident, 7);
        assert_eq!(stats.evictions, 4);
    }

    #[tokio::test]
    async fn test_default_capacity_evicts_oldest() {
        let config = StreamingConfig {
            chunk_size: 10,
            ..Default::default()
        };
        let max = config.max_loaded_chunks;
        let (store, _) = make_store(&config);
        let coord = |i: usize| ChunkCoord::new((i % 10) as i32, (i / 10) as i32);
        let evicted = |store: &ChunkStore, loaded: usize| -> Vec<usize> {
            (0..loaded).filter(|&i| !store.is_resident(coord(i))).collect()
        };

        // Eleven past capacity: one pass down to 40, then ten more loads
        for i in 0..max + 11 {
            store.load_chunk(coord(i)).await.unwrap();
        }
        assert_eq!(store.stats().resident, max);
        assert_eq!(evicted(&store, max + 11), (0..=10).collect::<Vec<_>>());

        // Headroom means a second pass evicts more than the overflow: four
        // more loads trigger it and leave 43 resident
        for i in max + 11..max + 15 {
            store.load_chunk(coord(i)).await.unwrap();
        }
        assert_eq!(store.stats().resident, 43);
        assert_eq!(evicted(&store, max + 15), (0..=21).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_required_chunks_survive_eviction() {
        let (store, _) = make_store(&config(4, 0, 3600));
        let protected = [ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)];
        store.set_required(protected);

        for x in 0..10 {
            store.load_chunk(ChunkCoord::new(x, 0)).await.unwrap();
        }

        for coord in protected {
            assert!(store.is_resident(coord));
        }
        assert_eq!(store.stats().resident, 4);
        assert_eq!(store.stats().protected, 2);
    }

    #[tokio::test]
    async fn test_required_set_larger_than_capacity() {
        let (store, _) = make_store(&config(2, 0, 3600));
        let protected: Vec<_> = (0..4).map(|x| ChunkCoord::new(x, 0)).collect();
        store.set_required(protected.iter().copied());

        for coord in &protected {
            store.load_chunk(*coord).await.unwrap();
        }
        assert_eq!(store.stats().resident, 4);
        assert_eq!(store.stats().evictions, 0);
    }

    #[tokio::test]
    async fn test_generation_failure_then_retry() {
        let (store, source) = make_store(&config(50, 10, 300));
        let coord = ChunkCoord::new(2, 2);
        source.fail.store(true, Ordering::SeqCst);

        let err = store.load_chunk(coord).await.unwrap_err();
        assert!(matches!(err, StreamError::Generation { coord: c, .. } if c == coord));
        let stats = store.stats();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.resident, 0);
        assert_eq!(stats.failed_generations, 1);

        source.fail.store(false, Ordering::SeqCst);
        let chunk = store.load_chunk(coord).await.unwrap();
        assert_eq!(chunk.coord, coord);
        assert_eq!(store.stats().generations, 1);
    }

    #[tokio::test]
    async fn test_generator_panic_is_reported() {
        let (store, source) = make_store(&config(50, 10, 300));
        source.panic.store(true, Ordering::SeqCst);

        let err = store.get_tile(5, 5).await.unwrap_err();
        assert!(matches!(err, StreamError::Generation { .. }));
        assert!(!store.is_pending(ChunkCoord::new(0, 0)));

        source.panic.store(false, Ordering::SeqCst);
        assert!(store.get_tile(5, 5).await.is_ok());
    }

    #[tokio::test]
    async fn test_request_dedups_with_load() {
        let (store, _) = make_store(&config(50, 10, 300));
        let coord = ChunkCoord::new(4, 4);

        assert!(store.request(coord));
        assert!(!store.request(coord));
        assert!(!store.request(ChunkCoord::new(-1, 0)));

        store.load_chunk(coord).await.unwrap();
        assert_eq!(store.stats().generations, 1);
        assert!(!store.request(coord));
        assert!(store.resident(coord).is_some());
    }

    #[tokio::test]
    async fn test_preload() {
        let (store, _) = make_store(&config(50, 10, 300));

        assert_eq!(store.preload(55.0, 55.0, 1).await.unwrap(), 9);
        // Corner: only the in-world quarter of the square
        assert_eq!(store.preload(0.0, 0.0, 1).await.unwrap(), 4);
        assert_eq!(store.stats().resident, 13);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_expired() {
        let (store, _) = make_store(&config(50, 10, 300));
        let old = ChunkCoord::new(0, 0);
        let fresh = ChunkCoord::new(1, 0);
        let pinned = ChunkCoord::new(2, 0);
        store.set_required([pinned]);

        store.load_chunk(old).await.unwrap();
        store.load_chunk(pinned).await.unwrap();
        tokio::time::advance(Duration::from_secs(200)).await;
        store.load_chunk(fresh).await.unwrap();
        tokio::time::advance(Duration::from_secs(150)).await;

        assert_eq!(store.evict_expired(), 1);
        assert!(!store.is_resident(old));
        assert!(store.is_resident(fresh));
        assert!(store.is_resident(pinned));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_eviction_prefers_expired() {
        let (store, _) = make_store(&config(3, 0, 300));

        store.load_chunk(ChunkCoord::new(0, 0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(400)).await;
        store.load_chunk(ChunkCoord::new(1, 0)).await.unwrap();
        store.load_chunk(ChunkCoord::new(2, 0)).await.unwrap();
        // Re-touch chunk 1; chunk 0 is both expired and oldest
        store.load_chunk(ChunkCoord::new(1, 0)).await.unwrap();
        store.load_chunk(ChunkCoord::new(3, 0)).await.unwrap();

        assert!(!store.is_resident(ChunkCoord::new(0, 0)));
        assert_eq!(
            store.resident_coords(),
            vec![ChunkCoord::new(1, 0), ChunkCoord::new(2, 0), ChunkCoord::new(3, 0)]
        );
    }
}
