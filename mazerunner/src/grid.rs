use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::errors::LoadError;
use crate::tracker::ClaimTracker;

/// State of a single maze cell.
///
/// Transitions only ever move forward (`Open`/`Start` to `Visited`, `Exit` to
/// `ExitClaimed`), which is what makes a claim a plain compare-and-swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Cell {
    Wall = 0,
    Open = 1,
    Start = 2,
    Exit = 3,
    Visited = 4,
    ExitClaimed = 5,
}

impl Cell {
    /// Maps a maze source character to its cell state
    pub fn from_glyph(c: char) -> Self {
        match c {
            'x' => Cell::Open,
            's' => Cell::Exit,
            'e' => Cell::Start,
            _ => Cell::Wall,
        }
    }

    /// Character used when rendering the cell
    pub fn glyph(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Open => 'x',
            Cell::Start => 'e',
            Cell::Exit => 's',
            Cell::Visited => '.',
            Cell::ExitClaimed => 'o',
        }
    }

    /// The state this cell moves to when claimed, if it can be claimed at all
    pub fn claimed(self) -> Option<Cell> {
        match self {
            Cell::Open | Cell::Start => Some(Cell::Visited),
            Cell::Exit => Some(Cell::ExitClaimed),
            Cell::Wall | Cell::Visited | Cell::ExitClaimed => None,
        }
    }

    /// Whether an explorer may still step onto this cell
    pub fn is_traversable(self) -> bool {
        matches!(self, Cell::Open | Cell::Exit)
    }

    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Cell::Open,
            2 => Cell::Start,
            3 => Cell::Exit,
            4 => Cell::Visited,
            5 => Cell::ExitClaimed,
            _ => Cell::Wall,
        }
    }
}

/// A validated `(row, col)` coordinate inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Orthogonal step directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Right,
    Down,
    Up,
    Left,
}

impl Direction {
    /// Order in which explorers consider neighbors. The first entry is continued on the
    /// current task; the rest become new branches.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Left,
    ];
}

/// Fixed-size maze shared by all explorers of one search.
///
/// Cell state lives in a [`ClaimTracker`]; [`Grid::try_claim`] is the only way to
/// change it.
#[derive(Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: ClaimTracker,
    start: Position,
    exits: Vec<Position>,
    searched: AtomicBool,
}

impl Grid {
    /// Reads and parses a maze file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| LoadError::unreadable(path, e))?;
        debug!("Loaded maze source from {}", path.display());
        Self::parse(&source)
    }

    /// Parses a maze from its textual form.
    ///
    /// The first two whitespace-separated tokens are `rows` and `cols`; every
    /// following non-whitespace character is one cell, read row by row.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        let source = source.trim_start();
        let (rows, rest) = next_dimension(source, "rows")?;
        let (cols, rest) = next_dimension(rest, "cols")?;

        let total = rows
            .checked_mul(cols)
            .ok_or_else(|| LoadError::malformed(format!("{rows}x{cols} is too large")))?;
        if total == 0 {
            return Err(LoadError::malformed(format!(
                "{rows}x{cols} grid has no cells"
            )));
        }

        let mut glyphs = rest.chars().filter(|c| !c.is_whitespace());
        let mut cells = Vec::with_capacity(total);
        let mut starts = Vec::new();
        let mut exits = Vec::new();

        for index in 0..total {
            let Some(glyph) = glyphs.next() else {
                return Err(LoadError::malformed(format!(
                    "expected {total} cells, found {index}"
                )));
            };
            let cell = Cell::from_glyph(glyph);
            let pos = Position::new(index / cols, index % cols);
            match cell {
                Cell::Start => starts.push(pos),
                Cell::Exit => exits.push(pos),
                _ => {}
            }
            cells.push(cell);
        }

        let surplus = glyphs.count();
        if surplus > 0 {
            warn!("Ignoring {} cell tokens beyond the {}x{} grid", surplus, rows, cols);
        }

        let start = match starts.as_slice() {
            [] => return Err(LoadError::NoStartCell),
            [start] => *start,
            many => return Err(LoadError::MultipleStartCells(many.len())),
        };

        debug!(
            "Parsed {}x{} maze, start {}, {} exits",
            rows,
            cols,
            start,
            exits.len()
        );

        Ok(Self {
            rows,
            cols,
            cells: ClaimTracker::new(cells),
            start,
            exits,
            searched: AtomicBool::new(false),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The unique start cell
    pub fn start(&self) -> Position {
        self.start
    }

    /// Exit cells as they were at load time
    pub fn exits(&self) -> &[Position] {
        &self.exits
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Current state of the cell at `pos`, or `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells.get(i))
    }

    /// Claims the cell at `pos` for the calling explorer.
    ///
    /// Succeeds for at most one caller per cell; out-of-bounds positions, walls and
    /// already-claimed cells return `false`.
    pub fn try_claim(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells.try_claim(i))
    }

    /// The in-bounds cell one step away in `dir`
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        let next = match dir {
            Direction::Right => Position::new(pos.row, pos.col.checked_add(1)?),
            Direction::Down => Position::new(pos.row.checked_add(1)?, pos.col),
            Direction::Up => Position::new(pos.row.checked_sub(1)?, pos.col),
            Direction::Left => Position::new(pos.row, pos.col.checked_sub(1)?),
        };
        self.is_in_bounds(next).then_some(next)
    }

    /// Neighbors that currently look traversable, in [`Direction::PRIORITY`] order.
    ///
    /// Another explorer may claim any of them right after this returns; the claim at
    /// the next step is what decides ownership.
    pub fn open_neighbors(&self, pos: Position) -> Vec<Position> {
        Direction::PRIORITY
            .iter()
            .filter_map(|&dir| self.neighbor(pos, dir))
            .filter(|&next| self.get(next).is_some_and(Cell::is_traversable))
            .collect()
    }

    /// Number of successful claims made against this grid
    pub fn claimed_count(&self) -> u64 {
        self.cells.claims()
    }

    /// Current state of every cell, row-major
    pub fn cells(&self) -> Vec<Cell> {
        self.cells.states()
    }

    /// Renders the grid as rows of glyphs separated by newlines
    pub fn snapshot(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for (i, cell) in self.cells.states().into_iter().enumerate() {
            if i > 0 && i % self.cols == 0 {
                out.push('\n');
            }
            out.push(cell.glyph());
        }
        out
    }

    /// Marks the grid as handed to a search. Returns `false` if it already was.
    pub(crate) fn begin_search(&self) -> bool {
        !self.searched.swap(true, Ordering::AcqRel)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.is_in_bounds(pos).then(|| pos.row * self.cols + pos.col)
    }
}

fn next_dimension<'a>(source: &'a str, name: &str) -> Result<(usize, &'a str), LoadError> {
    let source = source.trim_start();
    let end = source.find(char::is_whitespace).unwrap_or(source.len());
    let (token, rest) = source.split_at(end);
    if token.is_empty() {
        return Err(LoadError::malformed(format!("missing {name}")));
    }
    let value = token.parse::<usize>().map_err(|_| {
        LoadError::malformed(format!(
            "{name} must be a non-negative integer, got '{token}'"
        ))
    })?;
    Ok((value, rest))
}
