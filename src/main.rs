//! Manhunt -- a hidden-movement pursuit engine implementing the SYI protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout,
//! following the SYI (Scotland Yard Interface) convention.

use std::io::{self, BufRead};

use manhunt::engine::{Engine, EngineError};
use manhunt::protocol::parser::{parse_command, Command};

/// Runs the main SYI protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    // Diagnostics go to stderr; stdout carries only protocol responses.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let result: Result<(), EngineError> = match cmd {
            Command::Syi => engine.handle_syi(&mut out).map_err(Into::into),
            Command::IsReady => engine.handle_isready(&mut out).map_err(Into::into),
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => {
                engine.new_game();
                Ok(())
            }
            Command::Position { json } => engine.set_position(&json),
            Command::Go(params) => engine.handle_go(&params, &mut out),
            Command::Stop => {
                // Search is synchronous and bounded by its deadline; nothing to interrupt.
                Ok(())
            }
            Command::Quit => break,
        };

        if let Err(e) = result {
            eprintln!("{}", e);
        }
    }

    if let Err(e) = engine.shutdown() {
        eprintln!("{}", e);
    }
}
