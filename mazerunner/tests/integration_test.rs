use anyhow::Result;
use mazerunner::{
    Cell, Frame, Grid, MazeConfig, NullRenderer, Position, RenderSink, SearchCoordinator,
    SearchOptions, SearchResult,
};
use std::collections::{HashSet, VecDeque};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

fn options(threads: usize) -> SearchOptions {
    SearchOptions {
        thread_count: NonZeroUsize::new(threads).unwrap(),
        step_delay: Duration::ZERO,
    }
}

fn solve(source: &str, threads: usize) -> Result<(Grid, SearchResult)> {
    let grid = Grid::parse(source)?;
    let report = SearchCoordinator::new(options(threads), &NullRenderer).run(&grid, grid.start())?;
    assert_eq!(report.stats.outstanding_tasks(), 0);
    Ok((grid, report.result))
}

/// Cells reachable from the start, stepping through anything that is not a wall
fn reachable(grid: &Grid) -> HashSet<Position> {
    let mut seen = HashSet::from([grid.start()]);
    let mut queue = VecDeque::from([grid.start()]);
    while let Some(pos) = queue.pop_front() {
        let candidates = [
            (pos.row, pos.col + 1),
            (pos.row + 1, pos.col),
            (pos.row.wrapping_sub(1), pos.col),
            (pos.row, pos.col.wrapping_sub(1)),
        ];
        for (row, col) in candidates {
            let next = Position::new(row, col);
            if grid.get(next).is_some_and(|c| c != Cell::Wall) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Deterministic maze generator so failures are reproducible
fn generated_maze(seed: u64, rows: usize, cols: usize) -> String {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) % 100
    };

    let start = (next() as usize % rows, next() as usize % cols);
    let mut out = format!("{} {}\n", rows, cols);
    for row in 0..rows {
        for col in 0..cols {
            let glyph = if (row, col) == start {
                'e'
            } else {
                match next() {
                    0..=2 => 's',
                    3..=37 => '#',
                    _ => 'x',
                }
            };
            out.push(glyph);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

#[test]
fn test_open_maze_found() -> Result<()> {
    let (_, result) = solve("3 3\ne x x\nx x x\nx x s\n", 4)?;
    assert_eq!(result, SearchResult::Found(Position::new(2, 2)));
    Ok(())
}

#[test]
fn test_walled_middle_row_not_found() -> Result<()> {
    let (grid, result) = solve("3 3\ne x x\n# # #\nx x s\n", 4)?;
    assert_eq!(result, SearchResult::NotFound);
    // The whole top row was explored, the bottom row never touched
    assert_eq!(grid.snapshot(), "...\n###\nxxs");
    Ok(())
}

#[test]
fn test_no_exits() -> Result<()> {
    let (grid, result) = solve("2 3\ne x x\nx # x\n", 2)?;
    assert_eq!(result, SearchResult::NotFound);
    assert_eq!(grid.claimed_count(), 5);
    Ok(())
}

#[test]
fn test_isolated_start() -> Result<()> {
    let (grid, result) = solve("3 3\n# # #\n# e #\n# # s\n", 2)?;
    assert_eq!(result, SearchResult::NotFound);
    assert_eq!(grid.claimed_count(), 1);
    Ok(())
}

#[test]
fn test_search_from_exit_cell() -> Result<()> {
    let grid = Grid::parse("1 3 e x s")?;
    let exit = Position::new(0, 2);
    let report = SearchCoordinator::new(options(2), &NullRenderer).run(&grid, exit)?;
    assert_eq!(report.result, SearchResult::Found(exit));
    assert_eq!(report.stats.cells_claimed, 1);
    assert_eq!(report.stats.tasks_spawned, 0);
    Ok(())
}

#[test]
fn test_adjacent_exit() -> Result<()> {
    let (grid, result) = solve("1 2 e s", 1)?;
    assert_eq!(result, SearchResult::Found(Position::new(0, 1)));
    assert_eq!(grid.snapshot(), ".o");
    Ok(())
}

#[test]
fn test_one_of_many_exits_claimed() -> Result<()> {
    let source = "5 5\n\
                  s x x x s\n\
                  x # x # x\n\
                  x x e x x\n\
                  x # x # x\n\
                  s x x x s\n";
    let (grid, result) = solve(source, 8)?;
    let SearchResult::Found(exit) = result else {
        panic!("expected an exit to be found");
    };
    assert!(grid.exits().contains(&exit));
    assert_eq!(grid.get(exit), Some(Cell::ExitClaimed));
    Ok(())
}

#[test]
fn test_verdict_is_stable_across_runs() -> Result<()> {
    let connected = "4 6\n\
                     e x x # x x\n\
                     x # x x x #\n\
                     x # # # x x\n\
                     x x x # # s\n";
    let disconnected = "4 6\n\
                        e x x # x x\n\
                        x # x # x #\n\
                        x # # # x x\n\
                        x x x # # s\n";
    for _ in 0..20 {
        assert!(solve(connected, 4)?.1.is_found());
        assert!(!solve(disconnected, 4)?.1.is_found());
    }
    Ok(())
}

#[test]
fn test_every_cell_claimed_at_most_once() -> Result<()> {
    let source = format!("30 30\n{}", "x ".repeat(30 * 30)).replacen('x', "e", 1);
    let grid = Grid::parse(&source)?;
    let report = SearchCoordinator::new(options(8), &NullRenderer).run(&grid, grid.start())?;
    assert_eq!(report.result, SearchResult::NotFound);

    // A double claim would push the claim count above the number of claimed cells
    let claimed_cells = grid
        .cells()
        .into_iter()
        .filter(|c| matches!(c, Cell::Visited | Cell::ExitClaimed))
        .count() as u64;
    assert_eq!(claimed_cells, 30 * 30);
    assert_eq!(grid.claimed_count(), claimed_cells);
    assert_eq!(report.stats.cells_claimed, claimed_cells);
    assert!(report.stats.tasks_spawned > 0);
    assert_eq!(report.stats.tasks_spawned, report.stats.tasks_joined);
    Ok(())
}

#[test]
fn test_generated_mazes_match_reachability() -> Result<()> {
    for seed in 0..60 {
        let source = generated_maze(seed, 9, 11);
        let grid = Grid::parse(&source)?;
        let reach = reachable(&grid);
        let exit_reachable = grid.exits().iter().any(|exit| reach.contains(exit));

        let threads = 1 + (seed as usize % 4);
        let report =
            SearchCoordinator::new(options(threads), &NullRenderer).run(&grid, grid.start())?;

        assert_eq!(
            report.result.is_found(),
            exit_reachable,
            "seed {seed} disagreed with reachability:\n{source}"
        );
        assert_eq!(report.stats.outstanding_tasks(), 0);

        // Claims never leak past walls
        for (index, cell) in grid.cells().into_iter().enumerate() {
            let pos = Position::new(index / grid.cols(), index % grid.cols());
            if matches!(cell, Cell::Visited | Cell::ExitClaimed) {
                assert!(reach.contains(&pos), "seed {seed}: {pos} claimed but unreachable");
            }
        }

        // An exhausted search has walked everything it could reach
        if !exit_reachable {
            for pos in &reach {
                assert_eq!(grid.get(*pos), Some(Cell::Visited), "seed {seed}: {pos} missed");
            }
        }
    }
    Ok(())
}

/// Counts frames by kind
#[derive(Default)]
struct CountingRenderer {
    steps: AtomicUsize,
    finals: AtomicUsize,
}

impl RenderSink for CountingRenderer {
    fn render(&self, _grid: &Grid, frame: Frame) -> bool {
        match frame {
            Frame::Step => self.steps.fetch_add(1, Ordering::Relaxed),
            Frame::Final => self.finals.fetch_add(1, Ordering::Relaxed),
        };
        true
    }
}

#[test]
fn test_single_final_frame() -> Result<()> {
    let renderer = CountingRenderer::default();
    let grid = Grid::parse("3 3\ne x x\nx x x\nx x s\n")?;
    let options = SearchOptions {
        thread_count: NonZeroUsize::new(4).unwrap(),
        step_delay: Duration::from_millis(1),
    };
    let report = SearchCoordinator::new(options, &renderer).run(&grid, grid.start())?;

    assert!(report.result.is_found());
    assert_eq!(renderer.finals.load(Ordering::Relaxed), 1);
    assert!(renderer.steps.load(Ordering::Relaxed) >= 1);
    Ok(())
}

#[test]
fn test_no_final_frame_when_exhausted() -> Result<()> {
    let renderer = CountingRenderer::default();
    let grid = Grid::parse("2 2 e x # #")?;
    let report = SearchCoordinator::new(options(2), &renderer).run(&grid, grid.start())?;

    assert_eq!(report.result, SearchResult::NotFound);
    assert_eq!(renderer.finals.load(Ordering::Relaxed), 0);
    assert_eq!(renderer.steps.load(Ordering::Relaxed), 2);
    Ok(())
}

#[test]
fn test_search_with_config_file() -> Result<()> {
    let dir = tempdir()?;
    let maze_path = dir.path().join("maze.txt");
    std::fs::write(&maze_path, "2 3\ne # s\nx x x\n")?;

    let config_path = dir.path().join("config.yaml");
    std::fs::write(
        &config_path,
        format!(
            "maze_path: {:?}\nthread_count: 2\nstep_delay_ms: 0\nrender: false\n",
            maze_path.display().to_string()
        ),
    )?;

    let config = MazeConfig::load_from(Some(&config_path))?;
    let report = mazerunner::search(&config)?;
    assert_eq!(report.result, SearchResult::Found(Position::new(0, 2)));
    Ok(())
}
