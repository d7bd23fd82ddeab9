use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{MazeError, MazeResult};

/// Configuration for a maze search.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.mazerunner.yaml` in the current directory
/// 3. Global `$HOME/.config/mazerunner/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Maze file to solve
/// maze_path: "data/maze.txt"
///
/// # Explorer pool size (default: CPU cores)
/// thread_count: 4
///
/// # Pause after each claimed cell, in milliseconds
/// step_delay_ms: 50
///
/// # Draw the maze while exploring
/// render: true
///
/// # Minimum time between drawn frames (0 draws every step)
/// frame_interval_ms: 0
///
/// # Colorize rendered frames
/// color: true
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// Command-line arguments take precedence over file values; see [`MazeConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Maze source file
    #[serde(default = "default_maze_path")]
    pub maze_path: PathBuf,

    /// Number of worker threads explorers are scheduled on
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Delay after each claimed cell so the search can be watched
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Whether to draw frames to the terminal
    #[serde(default = "default_true")]
    pub render: bool,

    /// Step frames closer together than this are skipped
    #[serde(default)]
    pub frame_interval_ms: u64,

    /// Whether rendered frames use ANSI colors
    #[serde(default = "default_true")]
    pub color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_maze_path() -> PathBuf {
    PathBuf::from("maze.txt")
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_step_delay_ms() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Values given on the command line; `None` leaves the file value in place
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub maze_path: Option<PathBuf>,
    pub thread_count: Option<NonZeroUsize>,
    pub step_delay_ms: Option<u64>,
    pub render: Option<bool>,
    pub frame_interval_ms: Option<u64>,
    pub color: Option<bool>,
    pub log_level: Option<String>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            maze_path: default_maze_path(),
            thread_count: default_thread_count(),
            step_delay_ms: default_step_delay_ms(),
            render: true,
            frame_interval_ms: 0,
            color: true,
            log_level: default_log_level(),
        }
    }
}

impl MazeConfig {
    /// Loads configuration from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> MazeResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(MazeError::config_error(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("mazerunner/config.yaml")),
            // Local config
            Some(PathBuf::from(".mazerunner.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Every value the CLI supplied wins, even when it equals the built-in default.
    pub fn merge_with_cli(mut self, cli: ConfigOverrides) -> Self {
        if let Some(maze_path) = cli.maze_path {
            self.maze_path = maze_path;
        }
        if let Some(thread_count) = cli.thread_count {
            self.thread_count = thread_count;
        }
        if let Some(step_delay_ms) = cli.step_delay_ms {
            self.step_delay_ms = step_delay_ms;
        }
        if let Some(render) = cli.render {
            self.render = render;
        }
        if let Some(frame_interval_ms) = cli.frame_interval_ms {
            self.frame_interval_ms = frame_interval_ms;
        }
        if let Some(color) = cli.color {
            self.color = color;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        self
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
