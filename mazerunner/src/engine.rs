use tracing::{debug, info};

use crate::config::MazeConfig;
use crate::coordinator::{SearchCoordinator, SearchOptions};
use crate::errors::MazeResult;
use crate::grid::Grid;
use crate::render::{NullRenderer, RenderSink, TerminalRenderer};
use crate::results::SearchReport;

/// Loads the configured maze and searches it from its start cell
pub fn search(config: &MazeConfig) -> MazeResult<SearchReport> {
    info!("Loading maze from {}", config.maze_path.display());
    let grid = Grid::load(&config.maze_path)?;

    let terminal;
    let renderer: &dyn RenderSink = if config.render {
        terminal = TerminalRenderer::new(config.frame_interval(), config.color);
        &terminal
    } else {
        debug!("Rendering disabled");
        &NullRenderer
    };

    let options = SearchOptions {
        thread_count: config.thread_count,
        step_delay: config.step_delay(),
    };
    SearchCoordinator::new(options, renderer).run(&grid, grid.start())
}
