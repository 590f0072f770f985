//! Engine state management.
//!
//! Holds the current observed board, engine options, and the distance cache
//! shared across turns, and runs the search for the `go` command.

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::board::{BoardSnapshot, Graph};
use crate::eval::{CacheError, DistanceCache, JsonFileDistanceCache, MemoryDistanceCache};
use crate::protocol::notation::format_move;
use crate::protocol::parser::GoParams;
use crate::protocol::snapshot::{parse_snapshot, SnapshotError};
use crate::search::{format_score, pick_move, SearchConfig, SearchError};

/// Default search time in milliseconds.
const DEFAULT_MOVETIME_MS: u64 = 5000;

/// Default safety margin in milliseconds.
const DEFAULT_SAFETY_MARGIN_MS: u64 = 1000;

/// Default iterative-deepening limit.
const DEFAULT_MAX_DEPTH: u32 = 8;

/// Errors surfaced to the main loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no position set")]
    NoPosition,

    #[error("game is already decided")]
    GameOver,

    #[error("failed to parse position: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("distance cache: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub position: Option<BoardSnapshot>,
    pub options: HashMap<String, String>,
    memory_cache: Option<(Graph, Arc<MemoryDistanceCache>)>,
    file_cache: Option<Arc<JsonFileDistanceCache>>,
    rng: SmallRng,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a new engine with no position.
    pub fn new() -> Self {
        Engine {
            position: None,
            options: HashMap::new(),
            memory_cache: None,
            file_cache: None,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Resets the board for a new game. Cached distances are kept; they are
    /// dropped once a position arrives on a different map.
    pub fn new_game(&mut self) {
        self.position = None;
    }

    /// Sets the current board from a JSON document.
    pub fn set_position(&mut self, json: &str) -> Result<(), EngineError> {
        let snapshot = parse_snapshot(json)?;
        self.position = Some(snapshot);
        Ok(())
    }

    /// Sets an engine option. `CacheFile` opens a persistent distance cache
    /// at the given path.
    pub fn set_option(&mut self, name: String, value: Option<String>) -> Result<(), EngineError> {
        if name == "CacheFile" {
            self.file_cache = match value.as_deref() {
                Some(path) if !path.is_empty() => Some(Arc::new(JsonFileDistanceCache::open(path)?)),
                _ => None,
            };
        }
        self.options.insert(name, value.unwrap_or_default());
        Ok(())
    }

    fn option<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.options.get(name).and_then(|v| v.parse::<T>().ok())
    }

    /// Returns the configured search time from options, or the default.
    fn movetime(&self) -> Duration {
        Duration::from_millis(self.option("SearchTime").unwrap_or(DEFAULT_MOVETIME_MS))
    }

    /// Search configuration from options.
    fn search_config(&self) -> SearchConfig {
        SearchConfig {
            safety_margin: Duration::from_millis(
                self.option("SafetyMargin")
                    .unwrap_or(DEFAULT_SAFETY_MARGIN_MS),
            ),
            max_depth: self.option("MaxDepth").unwrap_or(DEFAULT_MAX_DEPTH),
            threads: self.option("Threads").unwrap_or(0),
            ..SearchConfig::default()
        }
    }

    /// The distance cache for searches on `graph`. A persistent cache is
    /// rebound to `graph` first, so entries from another map are never used.
    fn distance_cache(&mut self, graph: &Graph) -> Arc<dyn DistanceCache> {
        if let Some(file) = &self.file_cache {
            match file.bind(graph) {
                Ok(_) => return file.clone(),
                Err(e) => log::warn!("persistent distance cache unusable, using memory: {e}"),
            }
        }
        match &self.memory_cache {
            Some((cached_graph, cache)) if cached_graph == graph => cache.clone(),
            _ => {
                let cache = Arc::new(MemoryDistanceCache::new());
                self.memory_cache = Some((graph.clone(), cache.clone()));
                cache
            }
        }
    }

    /// Handles the SYI handshake: writes id, options, and syiok.
    pub fn handle_syi<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name manhunt")?;
        writeln!(out, "id author manhunt")?;
        writeln!(
            out,
            "option name SearchTime type spin default {} min 1 max 600000",
            DEFAULT_MOVETIME_MS
        )?;
        writeln!(out, "option name Threads type spin default 0 min 0 max 256")?;
        writeln!(
            out,
            "option name MaxDepth type spin default {} min 0 max 64",
            DEFAULT_MAX_DEPTH
        )?;
        writeln!(
            out,
            "option name SafetyMargin type spin default {} min 0 max 10000",
            DEFAULT_SAFETY_MARGIN_MS
        )?;
        writeln!(out, "option name CacheFile type string default <empty>")?;
        writeln!(out, "syiok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles the `go` command: searches the current board and writes
    /// `info` lines followed by `bestmove <notation>`.
    ///
    /// If the search cannot use the board, a random legal move is played
    /// instead and the failure is still reported.
    pub fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> Result<(), EngineError> {
        let snapshot = self.position.clone().ok_or(EngineError::NoPosition)?;
        if !snapshot.winner.is_empty() || snapshot.legal_moves.is_empty() {
            return Err(EngineError::GameOver);
        }

        let budget = params
            .movetime
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.movetime());
        let mut config = self.search_config();
        if let Some(depth) = params.depth {
            config.max_depth = depth;
        }
        let cache = self.distance_cache(&snapshot.setup.graph);

        let outcome = pick_move(&snapshot, budget, &config, Some(cache), out);
        let failure = match outcome {
            Ok(result) => {
                writeln!(
                    out,
                    "info string score {} depth {}",
                    format_score(result.score),
                    result.depth.map_or("none".to_string(), |d| d.to_string())
                )?;
                writeln!(out, "bestmove {}", format_move(&result.best_move))?;
                None
            }
            Err(e) => {
                if let Some(mv) = snapshot.legal_moves.choose(&mut self.rng) {
                    writeln!(out, "bestmove {}", format_move(mv))?;
                }
                Some(EngineError::from(e))
            }
        };
        out.flush()?;

        if let Some(file) = &self.file_cache {
            file.flush()?;
        }
        failure.map_or(Ok(()), Err)
    }

    /// Writes any persistent cache to disk.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        if let Some(file) = &self.file_cache {
            file.flush()?;
        }
        Ok(())
    }
}
