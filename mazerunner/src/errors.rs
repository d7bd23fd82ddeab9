//! This module defines the error types for mazerunner.
//!
//! # Error Taxonomy
//!
//! Only two kinds of failure exist in a search:
//!
//! 1. **Load failures** (`LoadError`) - the maze source could not be read or does not
//!    describe a valid grid. These are fatal and surface before any explorer starts.
//! 2. **Setup failures** (`MazeError`) - bad configuration, a start outside the grid, a
//!    worker pool that cannot be built, or an attempt to search a grid twice.
//!
//! Losing a race for a cell is not represented here at all. Two explorers reaching the
//! same cell is an ordinary event, so the loser simply gets `false` back from the claim:
//! ```rust,ignore
//! if !grid.try_claim(pos) {
//!     return Step::Stop; // another branch owns this corridor
//! }
//! ```
//!
//! Callers propagate everything else with `?`:
//! ```rust,ignore
//! match Grid::load(path) {
//!     Ok(grid) => // search it,
//!     Err(LoadError::NoStartCell) => // report missing 'e',
//!     Err(e) => // other load failure
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::grid::Position;

/// Result type for maze operations
pub type MazeResult<T> = Result<T, MazeError>;

/// Errors raised while turning a maze source into a grid
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to read maze {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed maze dimensions: {0}")]
    MalformedDimensions(String),
    #[error("Maze has no start cell ('e')")]
    NoStartCell,
    #[error("Maze has {0} start cells ('e'), expected exactly one")]
    MultipleStartCells(usize),
}

/// Errors that can occur while configuring or running a search
#[derive(Error, Debug)]
pub enum MazeError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to build explorer pool: {0}")]
    ThreadPool(String),
    #[error("Grid has already been searched; load a fresh copy to search again")]
    GridAlreadySearched,
    #[error("Start {0} is outside the grid")]
    InvalidStart(Position),
}

impl LoadError {
    pub fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDimensions(msg.into())
    }
}

impl MazeError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }
}

impl From<config::ConfigError> for MazeError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
