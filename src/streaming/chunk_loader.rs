//! In-flight chunk load tracking
//!
//! At most one generation runs per chunk. The first caller to miss the cache
//! becomes the leader and starts the work; everyone else arriving while it is
//! in flight joins the same load and is woken once with the shared outcome.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;

use crate::streaming::chunk::Chunk;
use crate::streaming::spatial::ChunkCoord;
use crate::streaming::StreamError;

/// Result of a single chunk load, shared by every waiter
pub type LoadOutcome = Result<Arc<Chunk>, StreamError>;

/// What a caller should do after registering interest in a chunk
#[derive(Debug)]
pub enum LoadTicket {
    /// No load was in flight; the caller must start one and later call
    /// [`PendingLoads::complete`]
    Start(LoadWaiter),
    /// A load is already running; just wait on it
    Join(LoadWaiter),
}

impl LoadTicket {
    pub fn is_start(&self) -> bool {
        matches!(self, LoadTicket::Start(_))
    }

    pub fn into_waiter(self) -> LoadWaiter {
        match self {
            LoadTicket::Start(waiter) | LoadTicket::Join(waiter) => waiter,
        }
    }
}

/// Handle used to await a pending load
#[derive(Debug)]
pub struct LoadWaiter {
    coord: ChunkCoord,
    rx: watch::Receiver<Option<LoadOutcome>>,
}

impl LoadWaiter {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Wait for the load to finish.
    ///
    /// If the loader goes away without publishing an outcome the wait
    /// resolves to a generation error instead of hanging.
    pub async fn wait(mut self) -> LoadOutcome {
        let coord = self.coord;
        let outcome = match self.rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Err(abandoned(coord)))
    }
}

fn abandoned(coord: ChunkCoord) -> StreamError {
    StreamError::Generation {
        coord,
        reason: "load abandoned".to_string(),
    }
}

/// Registry of chunk loads currently in flight
#[derive(Default)]
pub struct PendingLoads {
    pending: HashMap<ChunkCoord, watch::Sender<Option<LoadOutcome>>>,
}

impl PendingLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in a chunk
    ///
    /// Returns [`LoadTicket::Start`] if the chunk was not pending (it is now),
    /// or [`LoadTicket::Join`] if a load is already running.
    pub fn begin(&mut self, coord: ChunkCoord) -> LoadTicket {
        if let Some(tx) = self.pending.get(&coord) {
            return LoadTicket::Join(LoadWaiter {
                coord,
                rx: tx.subscribe(),
            });
        }

        let (tx, rx) = watch::channel(None);
        self.pending.insert(coord, tx);
        LoadTicket::Start(LoadWaiter { coord, rx })
    }

    /// Clear the pending entry and wake every waiter with `outcome`
    ///
    /// Returns `false` if the chunk was not pending.
    pub fn complete(&mut self, coord: ChunkCoord, outcome: LoadOutcome) -> bool {
        match self.pending.remove(&coord) {
            Some(tx) => {
                // Waiters may all be gone; the outcome is still recorded
                tx.send_replace(Some(outcome));
                true
            }
            None => false,
        }
    }

    /// Number of chunks currently being loaded
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check if a specific chunk is currently pending
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains_key(&coord)
    }

    /// Number of callers currently waiting on a chunk
    pub fn waiters(&self, coord: ChunkCoord) -> usize {
        self.pending.get(&coord).map_or(0, |tx| tx.receiver_count())
    }
}
