use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::debug;

use crate::grid::Position;

/// Observable state of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    Searching,
    ExitFound(Position),
    Exhausted,
}

impl SearchOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchOutcome::Searching)
    }
}

/// Write-once outcome flag shared by all explorers of a search.
///
/// The first transition out of `Searching` wins; later attempts are ignored. Explorers
/// poll [`SharedOutcome::is_terminal`] to stop early once an exit has been claimed.
#[derive(Debug, Default)]
pub struct SharedOutcome {
    terminal: OnceCell<SearchOutcome>,
}

impl SharedOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> SearchOutcome {
        self.terminal
            .get()
            .copied()
            .unwrap_or(SearchOutcome::Searching)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.get().is_some()
    }

    /// Records the claimed exit. Returns `true` if this call decided the outcome.
    pub fn finish_found(&self, exit: Position) -> bool {
        self.finish(SearchOutcome::ExitFound(exit))
    }

    /// Records that no exit was reached. Returns `true` if this call decided the outcome.
    pub fn finish_exhausted(&self) -> bool {
        self.finish(SearchOutcome::Exhausted)
    }

    fn finish(&self, outcome: SearchOutcome) -> bool {
        let won = self.terminal.set(outcome).is_ok();
        if won {
            debug!("Search outcome settled: {:?}", outcome);
        }
        won
    }
}
