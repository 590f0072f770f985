//! Self-play game generation.
//!
//! Plays complete games between the evader agent and the detective agent,
//! both driven by `pick_move`, from random starting locations. Each move is
//! recorded with the board the mover saw, so games can be replayed or used
//! to tune the evaluator.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::board::{
    classic_reveals, default_mr_x_tickets, demo_graph, GameSetup, Graph, Location, Piece, Player,
    Position, PositionError, ALL_DETECTIVES, DEFAULT_DETECTIVE_TICKETS,
};
use crate::eval::{precompute_all_pairs, DistanceCache, MemoryDistanceCache};
use crate::movegen::random_move;
use crate::protocol::notation::format_move;
use crate::protocol::snapshot::SnapshotDoc;
use crate::search::{pick_move, SearchConfig, SearchError};

/// Errors that abort a single game.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("map has {nodes} locations, need {needed} for distinct starts")]
    MapTooSmall { nodes: usize, needed: usize },

    #[error("at most {} detectives are supported", ALL_DETECTIVES.len())]
    TooManyDetectives,

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Time budget per move search (milliseconds).
    pub movetime_ms: u64,
    /// Number of detectives, 1 to 5.
    pub detectives: usize,
    /// Map to play on; the built-in demo map if `None`.
    pub map: Option<Graph>,
    /// Reveal schedule; its length is the game length.
    pub reveals: Vec<bool>,
    /// Probability of playing a uniformly random move instead of searching.
    pub exploration: f64,
    /// Search settings used by both agents.
    pub search: SearchConfig,
    /// Number of games played concurrently.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            movetime_ms: 500,
            detectives: 2,
            map: None,
            reveals: classic_reveals(),
            exploration: 0.0,
            search: SearchConfig {
                threads: 1,
                max_depth: 4,
                ..SearchConfig::default()
            },
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    fn setup(&self) -> GameSetup {
        let graph = self.map.clone().unwrap_or_else(demo_graph);
        GameSetup::new(graph, self.reveals.clone())
    }

    fn rng_for(&self, game_id: usize) -> SmallRng {
        if self.seed != 0 {
            SmallRng::seed_from_u64(self.seed.wrapping_add(game_id as u64))
        } else {
            SmallRng::from_entropy()
        }
    }
}

/// Which side won a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    #[serde(rename = "mrx")]
    MrX,
    #[serde(rename = "detectives")]
    Detectives,
}

/// One move of a self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct MoveRecord {
    pub ply: usize,
    pub piece: Piece,
    #[serde(rename = "move")]
    pub notation: String,
    /// The board as the mover saw it.
    pub board: SnapshotDoc,
    /// Evader-perspective score; absent for random or decided moves.
    pub score: Option<f64>,
    /// Deepest completed iteration; absent for random moves or fallbacks.
    pub depth: Option<u32>,
    pub random: bool,
}

/// A complete self-play game record.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub start: Vec<(Piece, Location)>,
    pub moves: Vec<MoveRecord>,
    pub winner: Side,
    /// Moves the evader made.
    pub evader_moves: usize,
}

/// Picks distinct random starting locations, evader first.
fn random_start(
    setup: &Arc<GameSetup>,
    detectives: usize,
    rng: &mut SmallRng,
) -> Result<Position, SelfPlayError> {
    if detectives > ALL_DETECTIVES.len() {
        return Err(SelfPlayError::TooManyDetectives);
    }
    let nodes: Vec<Location> = setup.graph.nodes().collect();
    let needed = detectives + 1;
    if nodes.len() < needed {
        return Err(SelfPlayError::MapTooSmall {
            nodes: nodes.len(),
            needed,
        });
    }
    let starts: Vec<Location> = nodes.choose_multiple(rng, needed).copied().collect();

    let mr_x = Player::new(Piece::MrX, default_mr_x_tickets(detectives), starts[0]);
    let players = ALL_DETECTIVES[..detectives]
        .iter()
        .zip(&starts[1..])
        .map(|(&d, &l)| Player::new(Piece::Detective(d), DEFAULT_DETECTIVE_TICKETS, l))
        .collect();
    Ok(Position::start(Arc::clone(setup), mr_x, players)?)
}

/// Plays a single self-play game and returns the game record.
pub fn play_game(
    config: &SelfPlayConfig,
    game_id: usize,
    rng: &mut SmallRng,
    cache: Arc<dyn DistanceCache>,
) -> Result<GameRecord, SelfPlayError> {
    let setup = Arc::new(config.setup());
    let mut position = random_start(&setup, config.detectives, rng)?;
    let start = std::iter::once(position.mr_x())
        .chain(position.detectives())
        .map(|p| (p.piece, p.location))
        .collect();

    let movetime = Duration::from_millis(config.movetime_ms);
    let mut moves = Vec::new();
    let mut sink = std::io::sink();

    while let Some(&first) = position.legal_moves().first() {
        let viewer = first.commenced_by();
        let snapshot = position.observe(viewer);

        let explore = config.exploration > 0.0 && rng.gen::<f64>() < config.exploration;
        let random = if explore {
            random_move(&position, rng)
        } else {
            None
        };
        let (mv, score, depth) = match random {
            Some(mv) => (mv, None, None),
            None => {
                let result = pick_move(
                    &snapshot,
                    movetime,
                    &config.search,
                    Some(Arc::clone(&cache)),
                    &mut sink,
                )?;
                let score = result.score.is_finite().then_some(result.score);
                (result.best_move, score, result.depth)
            }
        };

        moves.push(MoveRecord {
            ply: moves.len(),
            piece: mv.commenced_by(),
            notation: format_move(&mv),
            board: SnapshotDoc::from_position(&position, viewer),
            score,
            depth,
            random: random.is_some(),
        });
        position = position.advance(&mv)?;
    }

    let winner = if position.winner().contains(Piece::MrX) {
        Side::MrX
    } else {
        Side::Detectives
    };
    Ok(GameRecord {
        game_id,
        start,
        moves,
        winner,
        evader_moves: position.moves_made(),
    })
}

/// Runs self-play generation, producing multiple game records.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| {
        games.push(game);
    });
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs self-play generation, calling `on_game` with each completed game record.
///
/// Games that fail are reported and skipped. Distances for the map are
/// computed once and shared by every game.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    let memory = Arc::new(MemoryDistanceCache::new());
    if let Err(e) = precompute_all_pairs(&config.setup().graph, memory.as_ref()) {
        log::warn!("failed to precompute distances: {e}");
    }
    let cache: Arc<dyn DistanceCache> = memory;

    if config.threads > 1 {
        run_self_play_parallel(config, cache, on_game);
    } else {
        run_self_play_sequential(config, cache, on_game);
    }
}

fn report(config: &SelfPlayConfig, n: usize, game: &GameRecord, started: Instant) {
    if config.quiet {
        return;
    }
    let outcome = match game.winner {
        Side::MrX => "mrx escapes",
        Side::Detectives => "detectives win",
    };
    eprintln!(
        "Game {}/{}: {} after {} evader moves ({:.1}s)",
        n,
        config.num_games,
        outcome,
        game.evader_moves,
        started.elapsed().as_secs_f64(),
    );
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, cache: Arc<dyn DistanceCache>, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let mut rng = config.rng_for(i);
        let game_start = Instant::now();
        match play_game(config, i, &mut rng, Arc::clone(&cache)) {
            Ok(game) => {
                report(config, i + 1, &game, game_start);
                on_game(game);
            }
            Err(e) => eprintln!("Game {} failed: {}", i, e),
        }
    }
}

/// Parallel self-play: plays games concurrently using rayon.
/// Uses a channel to deliver completed games to the callback from worker threads.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, cache: Arc<dyn DistanceCache>, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            log::warn!("failed to build rayon thread pool, playing sequentially: {e}");
            return run_self_play_sequential(config, cache, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let mut rng = config.rng_for(i);
                        let game_start = Instant::now();
                        match play_game(config, i, &mut rng, Arc::clone(&cache)) {
                            Ok(game) => {
                                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                                report(config, n, &game, game_start);
                                let _ = tx.send(game);
                            }
                            Err(e) => eprintln!("Game {} failed: {}", i, e),
                        }
                    });
            });
        });

        // Receive completed games on this thread and pass to callback.
        for game in rx {
            on_game(game);
        }
    });
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    let escapes = games.iter().filter(|g| g.winner == Side::MrX).count();
    let evader_moves: usize = games.iter().map(|g| g.evader_moves).sum();
    let plies: usize = games.iter().map(|g| g.moves.len()).sum();
    let pct = |n: usize| 100.0 * n as f64 / total.max(1) as f64;

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("MrX escapes: {} ({:.1}%)", escapes, pct(escapes));
    eprintln!(
        "Detective wins: {} ({:.1}%)",
        total - escapes,
        pct(total - escapes)
    );
    eprintln!(
        "Avg evader moves/game: {:.1}",
        evader_moves as f64 / total.max(1) as f64
    );
    eprintln!("Avg plies/game: {:.1}", plies as f64 / total.max(1) as f64);
}
