use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use tracing::trace;

use crate::grid::Cell;

/// Per-cell claim state shared by every explorer.
///
/// Each cell is stored as an `AtomicU8` holding a [`Cell`] discriminant. A claim is a
/// compare-and-swap from an unclaimed state (`Open`, `Start`, `Exit`) to its claimed
/// successor, so for any cell at most one `try_claim` ever returns `true`. No lock is
/// taken; explorers on disjoint corridors never contend.
#[derive(Debug)]
pub struct ClaimTracker {
    cells: Box<[AtomicU8]>,
    claims: AtomicU64,
}

impl ClaimTracker {
    /// Creates a tracker seeded with the loaded cell states
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            cells: cells
                .into_iter()
                .map(|cell| AtomicU8::new(cell as u8))
                .collect(),
            claims: AtomicU64::new(0),
        }
    }

    /// Reads the current state of a cell
    pub fn get(&self, index: usize) -> Cell {
        Cell::from_raw(self.cells[index].load(Ordering::Acquire))
    }

    /// Atomically moves a cell to its claimed state.
    ///
    /// Returns `false` without touching the cell if it is a wall or was already claimed.
    pub fn try_claim(&self, index: usize) -> bool {
        let slot = &self.cells[index];
        let mut current = slot.load(Ordering::Acquire);
        loop {
            let Some(next) = Cell::from_raw(current).claimed() else {
                return false;
            };
            match slot.compare_exchange_weak(
                current,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.claims.fetch_add(1, Ordering::Relaxed);
                    trace!("Claimed cell {} as {:?}", index, next);
                    return true;
                }
                // Spurious failure or a competing claim; re-inspect what is there now
                Err(actual) => current = actual,
            }
        }
    }

    /// Number of successful claims over the tracker's lifetime
    pub fn claims(&self) -> u64 {
        self.claims.load(Ordering::Relaxed)
    }

    /// Copies out the current state of every cell
    pub fn states(&self) -> Vec<Cell> {
        (0..self.cells.len()).map(|i| self.get(i)).collect()
    }
}
