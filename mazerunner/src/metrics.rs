use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Tracks explorer activity across all tasks of a search
#[derive(Debug, Clone)]
pub struct ExploreMetrics {
    // Task lifecycle
    tasks_spawned: Arc<AtomicU64>,
    tasks_joined: Arc<AtomicU64>,

    // Cell activity
    cells_claimed: Arc<AtomicU64>,
    claim_conflicts: Arc<AtomicU64>,
    dead_ends: Arc<AtomicU64>,
    cancellations: Arc<AtomicU64>,

    // Rendering
    frames: Arc<AtomicU64>,
}

impl ExploreMetrics {
    /// Creates a new ExploreMetrics instance
    pub fn new() -> Self {
        Self {
            tasks_spawned: Arc::new(AtomicU64::new(0)),
            tasks_joined: Arc::new(AtomicU64::new(0)),
            cells_claimed: Arc::new(AtomicU64::new(0)),
            claim_conflicts: Arc::new(AtomicU64::new(0)),
            dead_ends: Arc::new(AtomicU64::new(0)),
            cancellations: Arc::new(AtomicU64::new(0)),
            frames: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a child explorer being handed to the pool
    pub fn record_spawn(&self) {
        self.tasks_spawned.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a child explorer finishing
    pub fn record_join(&self) {
        self.tasks_joined.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim(&self) {
        self.cells_claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conflict(&self) {
        self.claim_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dead_end(&self) {
        self.dead_ends.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an explorer stopping because the search was already decided
    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> ExploreStats {
        ExploreStats {
            tasks_spawned: self.tasks_spawned.load(Ordering::Relaxed),
            tasks_joined: self.tasks_joined.load(Ordering::Relaxed),
            cells_claimed: self.cells_claimed.load(Ordering::Relaxed),
            claim_conflicts: self.claim_conflicts.load(Ordering::Relaxed),
            dead_ends: self.dead_ends.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            frames: self.frames.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Explorer stats:\n\
             Tasks spawned/joined: {}/{}\n\
             Cells claimed: {}\n\
             Claim conflicts: {}\n\
             Dead ends: {}\n\
             Cancellations: {}\n\
             Frames rendered: {}",
            stats.tasks_spawned,
            stats.tasks_joined,
            stats.cells_claimed,
            stats.claim_conflicts,
            stats.dead_ends,
            stats.cancellations,
            stats.frames
        );
    }
}

impl Default for ExploreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of explorer activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExploreStats {
    pub tasks_spawned: u64,
    pub tasks_joined: u64,
    pub cells_claimed: u64,
    pub claim_conflicts: u64,
    pub dead_ends: u64,
    pub cancellations: u64,
    pub frames: u64,
}

impl ExploreStats {
    /// Child explorers that were spawned but have not reported back
    pub fn outstanding_tasks(&self) -> u64 {
        self.tasks_spawned.saturating_sub(self.tasks_joined)
    }
}
