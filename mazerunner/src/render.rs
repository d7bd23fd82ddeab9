use colored::Colorize;
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::grid::{Cell, Grid};

/// Why a frame is being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// An explorer claimed a corridor cell
    Step,
    /// The exit was claimed; this is the last frame of the search
    Final,
}

/// Receives grid snapshots while a search runs.
///
/// Implementations are called concurrently from every explorer and must serialise
/// their own output.
pub trait RenderSink: Send + Sync {
    /// Presents the current grid. Returns `true` if a frame was actually drawn.
    fn render(&self, grid: &Grid, frame: Frame) -> bool;
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn render(&self, _grid: &Grid, _frame: Frame) -> bool {
        false
    }
}

/// Redraws the whole maze for each frame, on stdout unless another writer is given
#[derive(Debug)]
pub struct TerminalRenderer<W = io::Stdout> {
    min_interval: Duration,
    use_color: bool,
    state: Mutex<FrameState<W>>,
}

#[derive(Debug)]
struct FrameState<W> {
    out: W,
    last_frame: Option<Instant>,
}

impl TerminalRenderer {
    /// `min_interval` drops step frames arriving sooner than that after the previous
    /// frame. Final frames are always drawn.
    pub fn new(min_interval: Duration, use_color: bool) -> Self {
        Self::with_writer(io::stdout(), min_interval, use_color)
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn with_writer(out: W, min_interval: Duration, use_color: bool) -> Self {
        Self {
            min_interval,
            use_color,
            state: Mutex::new(FrameState {
                out,
                last_frame: None,
            }),
        }
    }

    /// Gives back the writer with everything drawn so far
    pub fn into_inner(self) -> W {
        self.state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .out
    }

    fn draw(&self, out: &mut W, grid: &Grid) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        for row in grid.cells().chunks(grid.cols()) {
            let line: String = if self.use_color {
                row.iter().map(|&cell| paint(cell)).collect()
            } else {
                row.iter().map(|cell| cell.glyph()).collect()
            };
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}

impl<W: Write + Send> RenderSink for TerminalRenderer<W> {
    fn render(&self, grid: &Grid, frame: Frame) -> bool {
        // Holding the lock across the draw keeps frames from tearing
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let now = Instant::now();
        if frame == Frame::Step
            && state
                .last_frame
                .is_some_and(|at| now.duration_since(at) < self.min_interval)
        {
            return false;
        }

        let FrameState { out, last_frame } = &mut *state;
        if let Err(e) = self.draw(out, grid) {
            warn!("Failed to render maze frame: {}", e);
            return false;
        }
        *last_frame = Some(now);
        true
    }
}

fn paint(cell: Cell) -> String {
    let glyph = cell.glyph().to_string();
    match cell {
        Cell::Wall => glyph.dimmed().to_string(),
        Cell::Open => glyph,
        Cell::Start => glyph.cyan().bold().to_string(),
        Cell::Exit => glyph.magenta().bold().to_string(),
        Cell::Visited => glyph.yellow().to_string(),
        Cell::ExitClaimed => glyph.green().bold().to_string(),
    }
}
