//! Expansion planner benchmark CLI.
//!
//! Plans random boards in parallel and outputs one JSON record per board.
//!
//! Usage:
//!   cargo run --release --bin expand-bench -- [OPTIONS]
//!
//! Options:
//!   --boards N        Number of boards to plan (default: 20)
//!   --size WxH        Board size (default: 18x18)
//!   --turn T          Game turn to plan from (default: 1)
//!   --cramped P       Share of cramped boards, 0.0-1.0 (default: 0.25)
//!   --time-limit MS   Planner budget per board in ms, 0 for none (default: 100)
//!   --no-diversify    Skip the diversification retries
//!   --shuffle         Try the launch menu in random order
//!   --threads N       Number of parallel threads (default: 4)
//!   --seed N          Random seed, 0 for entropy (default: 0)
//!   --config FILE     Planner configuration as JSON
//!   --output FILE     Output file path (default: stdout)
//!   --quiet           Suppress progress and summary output

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use early_expand::benchmark::{self, BenchmarkConfig, BenchmarkError};
use early_expand::expand::PlannerConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = BenchmarkConfig::default();
    let mut output_path: Option<String> = None;
    let mut time_limit: Option<u64> = None;
    let mut no_diversify = false;
    let mut shuffle = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--boards" => {
                i += 1;
                config.boards = parse_arg(&args, i, "--boards");
            }
            "--size" => {
                i += 1;
                let (w, h) = parse_size(&args, i);
                config.width = w;
                config.height = h;
            }
            "--turn" => {
                i += 1;
                config.turn = parse_arg(&args, i, "--turn");
            }
            "--cramped" => {
                i += 1;
                config.cramped_fraction = parse_arg(&args, i, "--cramped");
            }
            "--time-limit" => {
                i += 1;
                time_limit = Some(parse_arg(&args, i, "--time-limit"));
            }
            "--no-diversify" => {
                no_diversify = true;
            }
            "--shuffle" => {
                shuffle = true;
            }
            "--threads" => {
                i += 1;
                config.threads = parse_arg(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_arg(&args, i, "--seed");
            }
            "--config" => {
                i += 1;
                let path = arg_value(&args, i, "--config");
                config.planner = load_planner_config(path);
            }
            "--output" => {
                i += 1;
                output_path = Some(arg_value(&args, i, "--output").to_string());
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    // Flags win over the JSON file.
    if let Some(ms) = time_limit {
        config.planner.time_limit_ms = (ms > 0).then_some(ms);
    }
    if no_diversify {
        config.planner.diversify = false;
    }
    if shuffle {
        config.planner.shuffle = true;
    }

    let level = if config.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if !config.quiet {
        eprintln!(
            "Expansion benchmark: {} boards, {}x{}, turn {}, {:.0}% cramped, {} threads",
            config.boards,
            config.width,
            config.height,
            config.turn,
            config.cramped_fraction * 100.0,
            config.threads
        );
    }

    let start = Instant::now();
    let records = match benchmark::run_benchmark(&config) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("Benchmark failed: {}", err);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed();

    if !config.quiet {
        eprintln!(
            "Completed {} boards in {:.1}s",
            records.len(),
            elapsed.as_secs_f64()
        );
        benchmark::print_summary(&records);
    }

    let written = match output_path {
        Some(path) => File::create(&path).map_err(BenchmarkError::from).and_then(|file| {
            let mut writer = BufWriter::new(file);
            benchmark::write_jsonl(&records, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} records to {}", records.len(), path);
            }
            Ok(())
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            benchmark::write_jsonl(&records, &mut writer)
        }
    };
    if let Err(err) = written {
        eprintln!("Failed to write output: {}", err);
        process::exit(1);
    }
}

fn arg_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value,
        None => {
            eprintln!("Missing value for {}", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn parse_arg<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let value = arg_value(args, i, flag);
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            eprintln!("Invalid {} value: {}", flag, value);
            process::exit(1);
        }
    }
}

fn parse_size(args: &[String], i: usize) -> (usize, usize) {
    let value = arg_value(args, i, "--size");
    let parsed = value
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
    match parsed {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => {
            eprintln!("Invalid --size value: {} (expected WxH)", value);
            process::exit(1);
        }
    }
}

fn load_planner_config(path: &str) -> PlannerConfig {
    let parsed = fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|json| PlannerConfig::from_json(&json).map_err(|err| err.to_string()));
    match parsed {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load planner config {}: {}", path, err);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: expand-bench [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --boards N        Number of boards to plan (default: 20)");
    eprintln!("  --size WxH        Board size (default: 18x18)");
    eprintln!("  --turn T          Game turn to plan from (default: 1)");
    eprintln!("  --cramped P       Share of cramped boards, 0.0-1.0 (default: 0.25)");
    eprintln!("  --time-limit MS   Planner budget per board in ms, 0 for none (default: 100)");
    eprintln!("  --no-diversify    Skip the diversification retries");
    eprintln!("  --shuffle         Try the launch menu in random order");
    eprintln!("  --threads N       Number of parallel threads (default: 4)");
    eprintln!("  --seed N          Random seed, 0 for entropy (default: 0)");
    eprintln!("  --config FILE     Planner configuration as JSON");
    eprintln!("  --output FILE     Output file path (default: stdout)");
    eprintln!("  --quiet           Suppress progress and summary output");
    eprintln!("  --help            Show this help");
}
