use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mazerunner::{search, Cell, ConfigOverrides, Grid, MazeConfig, SearchReport, SearchResult};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status when the maze was searched completely without reaching an exit
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct SolveArgs {
    /// Maze file to solve (falls back to maze_path from the config file)
    maze: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of explorer threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Pause after each explored cell, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Minimum time between rendered frames, in milliseconds
    #[arg(long)]
    frame_interval_ms: Option<u64>,

    /// Do not draw the maze while exploring
    #[arg(long)]
    no_render: bool,

    /// Draw frames without colors
    #[arg(long)]
    no_color: bool,

    /// Print the final report as JSON (disables rendering)
    #[arg(long)]
    json: bool,

    /// Print explorer statistics after the verdict
    #[arg(short, long)]
    stats: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a maze for a path from its start to an exit
    Solve(Box<SolveArgs>),

    /// Validate a maze file and describe it without searching
    Inspect {
        /// Maze file to inspect
        maze: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(args) => {
            let file_config =
                MazeConfig::load_from(args.config.as_deref()).context("loading configuration")?;
            let config = file_config.merge_with_cli(cli_config(&args));
            init_logging(&config.log_level);
            debug!("Resolved configuration: {:?}", config);

            let report = search(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, args.stats);
            }

            Ok(match report.result {
                SearchResult::Found(_) => ExitCode::SUCCESS,
                SearchResult::NotFound => ExitCode::from(EXIT_NOT_FOUND),
            })
        }
        Commands::Inspect { maze } => {
            init_logging("warn");
            let grid = Grid::load(&maze)?;
            print_inspection(&grid);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Only flags the user actually passed override the configuration file
fn cli_config(args: &SolveArgs) -> ConfigOverrides {
    ConfigOverrides {
        maze_path: args.maze.clone(),
        thread_count: args.threads,
        step_delay_ms: args.delay_ms,
        render: (args.no_render || args.json).then_some(false),
        frame_interval_ms: args.frame_interval_ms,
        color: args.no_color.then_some(false),
        log_level: args.log_level.clone(),
    }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level; logs go to stderr, frames to stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_report(report: &SearchReport, stats: bool) {
    match report.result {
        SearchResult::Found(_) => println!("\n{}", report.summary().green().bold()),
        SearchResult::NotFound => println!("\n{}", report.summary().yellow().bold()),
    }

    if stats {
        let s = &report.stats;
        println!("Explorers spawned: {} (joined {})", s.tasks_spawned, s.tasks_joined);
        println!("Cells claimed: {}", s.cells_claimed);
        println!("Claim conflicts: {}", s.claim_conflicts);
        println!("Dead ends: {}", s.dead_ends);
        println!("Cancelled explorers: {}", s.cancellations);
        println!("Frames drawn: {}", s.frames);
    }
}

fn print_inspection(grid: &Grid) {
    let open = grid
        .cells()
        .into_iter()
        .filter(|&c| c == Cell::Open)
        .count();

    println!("Size: {}x{}", grid.rows(), grid.cols());
    println!("Start: {}", grid.start().to_string().cyan());
    if grid.exits().is_empty() {
        println!("Exits: {}", "none".yellow());
    } else {
        let exits: Vec<String> = grid.exits().iter().map(|p| p.to_string()).collect();
        println!("Exits: {}", exits.join(", ").magenta());
    }
    println!("Open cells: {}", open);
    println!("\n{}", grid.snapshot());
}
