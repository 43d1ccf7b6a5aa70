//! Priority queue for chunk loading based on distance and visibility

use crate::core::types::Vec2;
use crate::streaming::spatial::ChunkCoord;
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

/// Priority information for a chunk
#[derive(Clone, Copy, Debug)]
pub struct ChunkPriority {
    pub coord: ChunkCoord,
    pub priority: f32, // Higher = more important
    pub distance: f32, // Distance from viewport center
    pub visible: bool, // Inside the visible box
}

impl ChunkPriority {
    /// Calculate priority for a chunk from the viewport center
    pub fn calculate(coord: ChunkCoord, center: Vec2, chunk_size: i32, visible: bool) -> Self {
        let (cx, cy) = coord.center(chunk_size);
        let distance = center.distance(Vec2::new(cx, cy));

        // Closer = higher, visible = bonus
        let priority = 1.0 / (distance + 1.0) + if visible { 100.0 } else { 0.0 };

        Self {
            coord,
            priority,
            distance,
            visible,
        }
    }
}

// Implement Ord/PartialOrd for BinaryHeap (max-heap by default)
impl Eq for ChunkPriority {}

impl PartialEq for ChunkPriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for ChunkPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Ties fall back to coordinate order so popping is deterministic
        self.priority
            .total_cmp(&other.priority)
            .then_with(|| other.coord.cmp(&self.coord))
    }
}

impl PartialOrd for ChunkPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for chunk loading
pub struct ChunkPriorityQueue {
    heap: BinaryHeap<ChunkPriority>,
    max_distance: f32, // Don't queue chunks beyond this
}

impl ChunkPriorityQueue {
    /// Create a new priority queue with a maximum loading distance
    pub fn new(max_distance: f32) -> Self {
        Self {
            heap: BinaryHeap::new(),
            max_distance,
        }
    }

    /// Clear all queued chunks
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Add a chunk to the queue
    pub fn push(&mut self, priority: ChunkPriority) {
        if priority.distance <= self.max_distance {
            self.heap.push(priority);
        }
    }

    /// Get the highest priority chunk
    pub fn pop(&mut self) -> Option<ChunkPriority> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Rebuild the queue from a set of wanted chunks
    ///
    /// Chunks for which `is_loaded` returns true are skipped; the rest are
    /// ranked by visibility, then distance from `center`.
    pub fn update(
        &mut self,
        center: Vec2,
        chunk_size: i32,
        wanted: &BTreeSet<ChunkCoord>,
        visible: &BTreeSet<ChunkCoord>,
        is_loaded: impl Fn(ChunkCoord) -> bool,
    ) {
        self.clear();

        for &coord in wanted {
            if is_loaded(coord) {
                continue;
            }
            let priority = ChunkPriority::calculate(coord, center, chunk_size, visible.contains(&coord));
            self.push(priority);
        }
    }

    /// Pop every queued chunk, highest priority first
    pub fn drain_ordered(&mut self) -> Vec<ChunkCoord> {
        std::iter::from_fn(|| self.heap.pop()).map(|p| p.coord).collect()
    }
}
