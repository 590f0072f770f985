//! Self-play game generation CLI.
//!
//! Plays evader-versus-detectives games via self-play and outputs the move
//! records as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of games to play (default: 10)
//!   --movetime MS    Search time per move in ms (default: 500)
//!   --detectives N   Number of detectives, 1-5 (default: 2)
//!   --map FILE       JSON map file (default: built-in demo map)
//!   --threads N      Number of parallel games (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress summary output

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use manhunt::protocol::snapshot::parse_graph;
use manhunt::selfplay::{self, SelfPlayConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games");
            }
            "--movetime" => {
                i += 1;
                config.movetime_ms = value(&args, i, "--movetime");
            }
            "--detectives" => {
                i += 1;
                config.detectives = value(&args, i, "--detectives");
            }
            "--map" => {
                i += 1;
                let path: String = value(&args, i, "--map");
                let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                    eprintln!("failed to read map {}: {}", path, e);
                    process::exit(1);
                });
                config.map = Some(parse_graph(&text).unwrap_or_else(|e| {
                    eprintln!("invalid map {}: {}", path, e);
                    process::exit(1);
                }));
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed");
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                quiet = true;
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

    config.quiet = quiet;

    if !quiet {
        eprintln!(
            "Self-play: {} games, {}ms/move, {} detectives, {} threads",
            config.num_games, config.movetime_ms, config.detectives, config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !quiet {
        eprintln!(
            "Completed {} games in {:.1}s ({:.1} games/hour)",
            games.len(),
            elapsed.as_secs_f64(),
            games.len() as f64 / elapsed.as_secs_f64() * 3600.0
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut writer)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)
        }
    };
    match (written, output_path) {
        (Err(e), _) => {
            eprintln!("failed to write output: {}", e);
            process::exit(1);
        }
        (Ok(()), Some(path)) if !quiet => {
            eprintln!("Wrote {} games to {}", games.len(), path);
        }
        _ => {}
    }
}

/// Parses the argument at `i`, exiting with a message if it is missing or invalid.
fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|a| a.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --movetime MS    Search time per move in ms (default: 500)");
    eprintln!("  --detectives N   Number of detectives, 1-5 (default: 2)");
    eprintln!("  --map FILE       JSON map file (default: built-in demo map)");
    eprintln!("  --threads N      Number of parallel games (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
