use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::grid::{Cell, Grid, Position};
use crate::metrics::ExploreMetrics;
use crate::outcome::SharedOutcome;
use crate::render::{Frame, RenderSink};

/// What an explorer does after handling one cell
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// This explorer claimed an exit
    Exit,
    /// Dead end, lost race, or search already decided
    Stop,
    /// Walk on to `next`; every entry in `branches` gets its own explorer
    Continue {
        next: Position,
        branches: Vec<Position>,
    },
}

/// One concurrent walker through the maze.
///
/// An explorer follows a single corridor on the calling thread. At every fork it hands
/// all but the first open neighbor to new explorers on the rayon pool, then keeps
/// walking the first one. Each call to [`Explorer::explore`] runs inside its own
/// `rayon::scope`, so it only returns after every explorer it spawned has returned.
pub struct Explorer<'a> {
    grid: &'a Grid,
    outcome: &'a SharedOutcome,
    renderer: &'a dyn RenderSink,
    metrics: &'a ExploreMetrics,
    step_delay: Duration,
}

impl<'a> Explorer<'a> {
    pub fn new(
        grid: &'a Grid,
        outcome: &'a SharedOutcome,
        renderer: &'a dyn RenderSink,
        metrics: &'a ExploreMetrics,
        step_delay: Duration,
    ) -> Self {
        Self {
            grid,
            outcome,
            renderer,
            metrics,
            step_delay,
        }
    }

    /// Explores from `start`. Returns `true` iff this explorer or one of its
    /// descendants claimed an exit.
    ///
    /// Must be called from inside a rayon pool for the branches to run in parallel;
    /// outside one, rayon's global pool is used.
    pub fn explore(&self, start: Position) -> bool {
        let child_found = AtomicBool::new(false);

        let found = rayon::scope(|scope| {
            let mut pos = start;
            loop {
                match self.step(pos) {
                    Step::Exit => return true,
                    Step::Stop => return false,
                    Step::Continue { next, branches } => {
                        for branch in branches {
                            self.metrics.record_spawn();
                            debug!("Branching at {}: new explorer for {}", pos, branch);
                            let child_found = &child_found;
                            scope.spawn(move |_| {
                                if self.explore(branch) {
                                    child_found.store(true, Ordering::Release);
                                }
                                self.metrics.record_join();
                            });
                        }
                        pos = next;
                    }
                }
            }
        });

        // The scope has joined every child by now
        found || child_found.load(Ordering::Acquire)
    }

    fn step(&self, pos: Position) -> Step {
        if self.outcome.is_terminal() {
            self.metrics.record_cancellation();
            trace!("Search already decided, explorer at {} stopping", pos);
            return Step::Stop;
        }

        match self.grid.get(pos) {
            Some(Cell::Exit) => return self.claim_exit(pos),
            None => return Step::Stop,
            Some(_) => {}
        }

        if !self.grid.try_claim(pos) {
            // Another explorer owns this corridor; the branches merge here
            self.metrics.record_conflict();
            trace!("Lost claim on {}", pos);
            return Step::Stop;
        }
        self.metrics.record_claim();

        if self.renderer.render(self.grid, Frame::Step) {
            self.metrics.record_frame();
        }
        if !self.step_delay.is_zero() {
            thread::sleep(self.step_delay);
        }

        let neighbors = self.grid.open_neighbors(pos);
        if let Some(&exit) = neighbors
            .iter()
            .find(|&&next| self.grid.get(next) == Some(Cell::Exit))
        {
            return self.claim_exit(exit);
        }

        let mut neighbors = neighbors.into_iter();
        match neighbors.next() {
            Some(next) => Step::Continue {
                next,
                branches: neighbors.collect(),
            },
            None => {
                self.metrics.record_dead_end();
                debug!("Dead end at {}", pos);
                Step::Stop
            }
        }
    }

    fn claim_exit(&self, exit: Position) -> Step {
        if !self.grid.try_claim(exit) {
            self.metrics.record_conflict();
            trace!("Exit {} already claimed", exit);
            return Step::Stop;
        }
        self.metrics.record_claim();

        // Only the explorer that settles the outcome draws the last frame
        if self.outcome.finish_found(exit) {
            info!("Exit claimed at {}", exit);
            if self.renderer.render(self.grid, Frame::Final) {
                self.metrics.record_frame();
            }
        }
        Step::Exit
    }
}
