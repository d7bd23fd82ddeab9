use rayon::ThreadPoolBuilder;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::errors::{MazeError, MazeResult};
use crate::explorer::Explorer;
use crate::grid::{Grid, Position};
use crate::metrics::ExploreMetrics;
use crate::outcome::{SearchOutcome, SharedOutcome};
use crate::render::RenderSink;
use crate::results::{SearchReport, SearchResult};

// Explorers nest one rayon scope per fork, so workers get more stack than the default
const EXPLORER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Tuning for a single search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Worker threads in the explorer pool
    pub thread_count: NonZeroUsize,
    /// Pause after each claimed cell
    pub step_delay: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            thread_count: NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN),
            step_delay: Duration::ZERO,
        }
    }
}

/// Owns the lifecycle of one search: builds the explorer pool, launches the root
/// explorer, and turns the shared outcome into a [`SearchResult`].
///
/// Every explorer spawned during [`SearchCoordinator::run`] has finished by the time it
/// returns.
pub struct SearchCoordinator<'r> {
    options: SearchOptions,
    renderer: &'r dyn RenderSink,
}

impl<'r> SearchCoordinator<'r> {
    pub fn new(options: SearchOptions, renderer: &'r dyn RenderSink) -> Self {
        Self { options, renderer }
    }

    /// Searches `grid` starting at `start`.
    ///
    /// A grid can only be searched once, since claimed cells never revert.
    pub fn run(&self, grid: &Grid, start: Position) -> MazeResult<SearchReport> {
        if !grid.is_in_bounds(start) {
            return Err(MazeError::InvalidStart(start));
        }
        if !grid.begin_search() {
            return Err(MazeError::GridAlreadySearched);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.thread_count.get())
            .stack_size(EXPLORER_STACK_SIZE)
            .thread_name(|i| format!("explorer-{}", i))
            .build()
            .map_err(|e| MazeError::thread_pool(e.to_string()))?;

        info!(
            "Starting search of {}x{} maze from {} with {} threads",
            grid.rows(),
            grid.cols(),
            start,
            self.options.thread_count
        );

        let outcome = SharedOutcome::new();
        let metrics = ExploreMetrics::new();
        let started = Instant::now();

        let explorer = Explorer::new(
            grid,
            &outcome,
            self.renderer,
            &metrics,
            self.options.step_delay,
        );
        let found = pool.install(|| explorer.explore(start));

        if !found {
            outcome.finish_exhausted();
        }
        let result = match outcome.get() {
            SearchOutcome::ExitFound(exit) => SearchResult::Found(exit),
            SearchOutcome::Exhausted | SearchOutcome::Searching => SearchResult::NotFound,
        };
        debug_assert_eq!(found, result.is_found());

        let elapsed = started.elapsed();
        let stats = metrics.get_stats();
        debug!(
            "Search joined {} of {} spawned explorers",
            stats.tasks_joined, stats.tasks_spawned
        );
        metrics.log_stats();
        info!("Search complete: {}", result);

        Ok(SearchReport {
            result,
            stats,
            elapsed,
        })
    }
}
