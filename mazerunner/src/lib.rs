pub mod config;
pub mod coordinator;
pub mod engine;
pub mod errors;
pub mod explorer;
pub mod grid;
pub mod metrics;
pub mod outcome;
pub mod render;
pub mod results;
pub mod tracker;

pub use config::{ConfigOverrides, MazeConfig};
pub use coordinator::{SearchCoordinator, SearchOptions};
pub use engine::search;
pub use errors::{LoadError, MazeError, MazeResult};
pub use grid::{Cell, Grid, Position};
pub use outcome::SearchOutcome;
pub use render::{Frame, NullRenderer, RenderSink, TerminalRenderer};
pub use results::{SearchReport, SearchResult};
