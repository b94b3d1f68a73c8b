//! Planner benchmarking harness.
//!
//! Generates seeded random boards, runs one independent planner invocation
//! per board, and records the result of each. Boards are planned in
//! parallel on a rayon pool; every invocation owns its board, matrices and
//! RNG, so nothing is shared between workers.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{encode_board, Board, TileId};
use crate::expand::{ExpansionPlanner, PlannerConfig, PlannerStats, CYCLE_TURNS};
use crate::search::{distance_map, opposite_weight_map, UNREACHABLE};

/// Mountain share on open boards.
const OPEN_MOUNTAIN_DENSITY: f64 = 0.12;

/// Mountain share on cramped boards.
const CRAMPED_MOUNTAIN_DENSITY: f64 = 0.3;

/// Neutral city share on every board.
const CITY_DENSITY: f64 = 0.03;

/// Garrison range for neutral cities.
const CITY_ARMY: std::ops::RangeInclusive<i32> = 40..=50;

/// Errors from a benchmark run.
#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("benchmark worker thread panicked")]
    WorkerPanicked,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for a benchmark run.
#[derive(Clone)]
pub struct BenchmarkConfig {
    /// Number of boards to plan.
    pub boards: usize,
    pub width: usize,
    pub height: usize,
    /// Game turn every board starts on.
    pub turn: u32,
    /// Probability that a board is generated cramped.
    pub cramped_fraction: f64,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Planner settings shared by every board. `cramped` is set per board.
    pub planner: PlannerConfig,
    /// Suppress per-board progress output.
    pub quiet: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            boards: 20,
            width: 18,
            height: 18,
            turn: 1,
            cramped_fraction: 0.25,
            threads: 4,
            seed: 0,
            planner: PlannerConfig::default(),
            quiet: false,
        }
    }
}

/// Result of planning one generated board.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkRecord {
    pub board_id: usize,
    pub width: usize,
    pub height: usize,
    pub turn: u32,
    pub root: TileId,
    pub cramped: bool,
    /// Tiles owned at the end of the cycle, or `None` if nothing was
    /// capturable.
    pub tile_captures: Option<usize>,
    pub launch_turn: Option<u32>,
    pub launches: usize,
    pub elapsed_ms: u64,
    pub stats: PlannerStats,
    /// Planner error message, if the invocation failed.
    pub error: Option<String>,
    /// The board in text notation, for reproducing the run.
    pub map: String,
}

/// Army a general holds on `turn` when it started with 1 on turn 1.
pub fn general_army_at(turn: u32) -> i32 {
    1 + (turn % CYCLE_TURNS / 2) as i32
}

/// Generates a random board with a single general for player 0.
///
/// Tiles next to the general are never mountains or cities.
pub fn random_board(
    width: usize,
    height: usize,
    turn: u32,
    cramped: bool,
    rng: &mut SmallRng,
) -> (Board, TileId) {
    let mut board = Board::new(width, height, turn);
    let root = rng.gen_range(0..board.len());
    board.set_general(root, 0, general_army_at(turn));

    let mountain_density = if cramped {
        CRAMPED_MOUNTAIN_DENSITY
    } else {
        OPEN_MOUNTAIN_DENSITY
    };
    for id in 0..board.len() {
        if id == root || board.adjacent(root).contains(&id) {
            continue;
        }
        let roll: f64 = rng.gen();
        if roll < mountain_density {
            board.set_mountain(id);
        } else if roll < mountain_density + CITY_DENSITY {
            let army = rng.gen_range(CITY_ARMY);
            let tile = board.tile_mut(id);
            tile.is_city = true;
            tile.army = army;
        }
    }
    (board, root)
}

/// Generates and plans one board.
pub fn run_board(config: &BenchmarkConfig, board_id: usize, rng: &mut SmallRng) -> BenchmarkRecord {
    let cramped = rng.gen_bool(config.cramped_fraction.clamp(0.0, 1.0));
    let (board, root) = random_board(config.width, config.height, config.turn, cramped, rng);
    let weights = opposite_weight_map(&board, root);
    let planner = PlannerConfig {
        cramped,
        seed: rng.gen(),
        ..config.planner.clone()
    };

    let start = Instant::now();
    let distances = distance_map(&board, &[root]);
    let mut stats = PlannerStats::default();
    let result = ExpansionPlanner::new(&board, root, &distances, &weights, &planner).and_then(|mut p| {
        let plan = p.optimize();
        stats = p.stats();
        plan
    });
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let mut record = BenchmarkRecord {
        board_id,
        width: config.width,
        height: config.height,
        turn: config.turn,
        root,
        cramped,
        tile_captures: None,
        launch_turn: None,
        launches: 0,
        elapsed_ms,
        stats,
        error: None,
        map: encode_board(&board),
    };
    match result {
        Ok(Some(plan)) => {
            record.tile_captures = Some(plan.tile_captures);
            record.launch_turn = Some(plan.launch_turn);
            record.launches = plan.launch_count();
        }
        Ok(None) => {
            let reachable = distances
                .iter()
                .filter(|&&d| d > 0 && d < UNREACHABLE)
                .count();
            debug!(board_id, reachable, "no plan for board");
        }
        Err(err) => {
            warn!(board_id, %err, "planner failed");
            record.error = Some(err.to_string());
        }
    }
    record
}

/// Runs the benchmark, producing one record per board.
///
/// When `config.threads > 1`, boards are planned concurrently using rayon.
pub fn run_benchmark(config: &BenchmarkConfig) -> Result<Vec<BenchmarkRecord>, BenchmarkError> {
    let mut records = Vec::with_capacity(config.boards);
    run_benchmark_with_callback(config, |record| records.push(record))?;
    records.sort_by_key(|r| r.board_id);
    Ok(records)
}

/// Runs the benchmark, calling `on_record` with each finished board as it
/// completes.
pub fn run_benchmark_with_callback<F>(config: &BenchmarkConfig, on_record: F) -> Result<(), BenchmarkError>
where
    F: FnMut(BenchmarkRecord) + Send,
{
    if config.threads > 1 {
        run_parallel(config, on_record)
    } else {
        run_sequential(config, on_record);
        Ok(())
    }
}

fn board_rng(seed: u64, board_id: usize) -> SmallRng {
    if seed != 0 {
        SmallRng::seed_from_u64(seed.wrapping_add(board_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn run_sequential<F>(config: &BenchmarkConfig, mut on_record: F)
where
    F: FnMut(BenchmarkRecord),
{
    for i in 0..config.boards {
        let mut rng = board_rng(config.seed, i);
        let record = run_board(config, i, &mut rng);
        if !config.quiet {
            report_progress(&record, i + 1, config.boards);
        }
        on_record(record);
    }
}

/// Plans boards on a rayon pool and hands finished records back over a
/// channel, so the callback always runs on the calling thread.
fn run_parallel<F>(config: &BenchmarkConfig, mut on_record: F) -> Result<(), BenchmarkError>
where
    F: FnMut(BenchmarkRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<BenchmarkRecord>();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.boards)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let mut rng = board_rng(config_clone.seed, i);
                    let record = run_board(&config_clone, i, &mut rng);
                    if !config_clone.quiet {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        report_progress(&record, n, config_clone.boards);
                    }
                    let _ = tx.send(record);
                });
        });
    });

    for record in rx {
        on_record(record);
    }

    handle.join().map_err(|_| BenchmarkError::WorkerPanicked)
}

fn report_progress(record: &BenchmarkRecord, done: usize, total: usize) {
    info!(
        board = record.board_id,
        done,
        total,
        captures = record.tile_captures,
        launches = record.launches,
        elapsed_ms = record.elapsed_ms,
        "board planned"
    );
}

/// Writes records as JSONL (one JSON object per board, one per line).
pub fn write_jsonl<W: Write>(records: &[BenchmarkRecord], out: &mut W) -> Result<(), BenchmarkError> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Aggregate numbers over a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub boards: usize,
    pub planned: usize,
    pub failed: usize,
    pub mean_captures: f64,
    pub mean_elapsed_ms: f64,
    pub max_elapsed_ms: u64,
}

pub fn summarize(records: &[BenchmarkRecord]) -> BenchmarkSummary {
    let planned: Vec<usize> = records.iter().filter_map(|r| r.tile_captures).collect();
    let total_ms: u64 = records.iter().map(|r| r.elapsed_ms).sum();
    BenchmarkSummary {
        boards: records.len(),
        planned: planned.len(),
        failed: records.iter().filter(|r| r.error.is_some()).count(),
        mean_captures: planned.iter().sum::<usize>() as f64 / planned.len().max(1) as f64,
        mean_elapsed_ms: total_ms as f64 / records.len().max(1) as f64,
        max_elapsed_ms: records.iter().map(|r| r.elapsed_ms).max().unwrap_or(0),
    }
}

/// Prints a summary of benchmark results to stderr.
pub fn print_summary(records: &[BenchmarkRecord]) {
    let summary = summarize(records);
    eprintln!("=== Expansion Benchmark Summary ===");
    eprintln!("Boards: {}", summary.boards);
    eprintln!("Planned: {} (failed {})", summary.planned, summary.failed);
    eprintln!("Avg tiles at turn 50: {:.2}", summary.mean_captures);
    eprintln!(
        "Avg time: {:.1}ms (max {}ms)",
        summary.mean_elapsed_ms, summary.max_elapsed_ms
    );
}
