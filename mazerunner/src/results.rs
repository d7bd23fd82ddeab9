use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use crate::grid::Position;
use crate::metrics::ExploreStats;

/// Final verdict of a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchResult {
    /// An explorer claimed the exit at this position
    Found(Position),
    /// Every reachable cell was explored without reaching an exit
    NotFound,
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchResult::Found(_))
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchResult::Found(pos) => write!(f, "Exit found at {}", pos),
            SearchResult::NotFound => write!(f, "No reachable exit"),
        }
    }
}

/// Everything a finished search reports back
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub result: SearchResult,
    pub stats: ExploreStats,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
}

impl SearchReport {
    /// One-line human summary, e.g. `Exit found at (2, 2) after 153ms (12 cells, 3 explorers)`
    pub fn summary(&self) -> String {
        format!(
            "{} after {} ({} cells, {} explorers)",
            self.result,
            humantime::format_duration(truncate_to_millis(self.elapsed)),
            self.stats.cells_claimed,
            self.stats.tasks_spawned + 1
        )
    }
}

fn truncate_to_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis().try_into().unwrap_or(u64::MAX))
}

fn serialize_elapsed<S: Serializer>(
    elapsed: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let formatted = humantime::format_duration(truncate_to_millis(*elapsed));
    serializer.serialize_str(&formatted.to_string())
}
