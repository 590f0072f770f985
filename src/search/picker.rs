//! Root move selection with iterative deepening.
//!
//! Given an observed board, builds the full-information position, applies
//! every candidate move, and searches each successor one ply deeper per
//! iteration until the deadline approaches. Only fully completed iterations
//! may replace the current best move.

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::board::{BoardSnapshot, Move, Position, PositionError, Whereabouts};
use crate::eval::{walks_into_capture, DistanceCache, DistanceTable};

use super::negamax::{search, SearchContext};
use super::tt::{TranspositionTable, DEFAULT_TT_CAPACITY};

/// Errors from move selection.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("no legal moves to choose from")]
    NoLegalMoves,

    #[error(transparent)]
    Position(#[from] PositionError),
}

/// Search tuning.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Nodes stop expanding once less than this remains before the deadline.
    /// Never more than a quarter of the budget is held back.
    pub safety_margin: Duration,
    /// Deepest iteration attempted.
    pub max_depth: u32,
    /// Children searched per interior node after ordering.
    pub max_branching: Option<usize>,
    /// Worker threads for root candidates: 0 uses the global rayon pool,
    /// 1 searches sequentially.
    pub threads: usize,
    pub tt_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            safety_margin: Duration::from_secs(1),
            max_depth: 8,
            max_branching: None,
            threads: 0,
            tt_capacity: DEFAULT_TT_CAPACITY,
        }
    }
}

/// Outcome of one decision.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    /// Score of `best_move` from the evader's perspective; 0 if no
    /// iteration completed.
    pub score: f64,
    /// Deepest fully completed iteration, if any.
    pub depth: Option<u32>,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Picks a move for whichever side is to act in `snapshot`.
///
/// The evader's agent maximizes the evader score; a detective agent
/// minimizes it. Ties go to the earliest candidate in the snapshot's move
/// order. `info` lines are written to `out` after each completed iteration.
pub fn pick_move<W: Write>(
    snapshot: &BoardSnapshot,
    budget: Duration,
    config: &SearchConfig,
    cache: Option<Arc<dyn DistanceCache>>,
    out: &mut W,
) -> Result<SearchResult, SearchError> {
    let start = Instant::now();
    let candidates = &snapshot.legal_moves;
    let Some(&first) = candidates.first() else {
        return Err(SearchError::NoLegalMoves);
    };

    let root = Position::from_snapshot(snapshot)?;
    let evader_agent = first.commenced_by().is_mr_x();
    let whereabouts = snapshot.whereabouts();
    // Infinite scores are only proof of a decided line when they are measured
    // against the evader's real location rather than an assumed one.
    let exact = snapshot.mr_x_location.is_some();

    let children = candidates
        .iter()
        .map(|mv| {
            let child = root.advance(mv)?;
            let trapped = evader_agent && walks_into_capture(&child, mv.final_destination());
            Ok(RootChild {
                whereabouts: whereabouts.after(mv),
                child,
                trapped,
            })
        })
        .collect::<Result<Vec<_>, PositionError>>()?;

    let table = match cache {
        Some(c) => DistanceTable::with_cache(root.shared_setup(), c),
        None => DistanceTable::new(root.shared_setup()),
    };
    let tt = TranspositionTable::new(config.tt_capacity);
    let margin = config.safety_margin.min(budget / 4);
    let ctx = SearchContext::new(start + budget, margin, &table, &tt)
        .with_max_branching(config.max_branching);

    let pool = build_pool(config.threads);

    let mut best: Option<(usize, f64, u32)> = None;
    for depth in 0..=config.max_depth {
        if ctx.out_of_time() {
            break;
        }

        let score_child = |rc: &RootChild| rc.evader_score(&ctx, depth);
        let scores: Vec<f64> = match (&pool, config.threads) {
            (_, 1) => children.iter().map(score_child).collect(),
            (Some(pool), _) => pool.install(|| children.par_iter().map(score_child).collect()),
            (None, _) => children.par_iter().map(score_child).collect(),
        };
        if ctx.timed_out() {
            break;
        }

        let (index, score) = select(&scores, evader_agent);
        best = Some((index, score, depth));

        let agent_score = if evader_agent { score } else { -score };
        let _ = writeln!(
            out,
            "info depth {} nodes {} score {} time {}",
            depth,
            ctx.nodes(),
            format_score(agent_score),
            start.elapsed().as_millis()
        );

        // Every line is decided; deeper iterations cannot change the choice.
        if exact && scores.iter().all(|s| s.is_infinite()) {
            break;
        }
    }

    let result = match best {
        Some((index, score, depth)) => SearchResult {
            best_move: candidates[index],
            score,
            depth: Some(depth),
            nodes: ctx.nodes(),
            elapsed: start.elapsed(),
        },
        None => {
            log::debug!("no search iteration completed; falling back to first candidate");
            SearchResult {
                best_move: first,
                score: 0.0,
                depth: None,
                nodes: ctx.nodes(),
                elapsed: start.elapsed(),
            }
        }
    };
    Ok(result)
}

/// One root candidate after it has been applied.
struct RootChild {
    child: Position,
    whereabouts: Whereabouts,
    trapped: bool,
}

impl RootChild {
    /// The evader-perspective score of this candidate at `depth`.
    fn evader_score(&self, ctx: &SearchContext, depth: u32) -> f64 {
        if self.trapped {
            return f64::NEG_INFINITY;
        }
        let s = search(
            ctx,
            &self.child,
            depth,
            f64::NEG_INFINITY,
            f64::INFINITY,
            self.whereabouts,
        );
        if self.child.mr_x_to_move() {
            s
        } else {
            -s
        }
    }
}

/// Index and score of the first maximum (evader) or first minimum (detectives).
fn select(scores: &[f64], maximize: bool) -> (usize, f64) {
    let mut best = (0, scores[0]);
    for (i, &s) in scores.iter().enumerate().skip(1) {
        let better = if maximize { s > best.1 } else { s < best.1 };
        if better {
            best = (i, s);
        }
    }
    best
}

/// Renders a score for `info` lines.
pub fn format_score(score: f64) -> String {
    if score == f64::INFINITY {
        "win".to_string()
    } else if score == f64::NEG_INFINITY {
        "loss".to_string()
    } else {
        format!("{}", score.round() as i64)
    }
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    if threads <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("failed to build {threads}-thread pool, using the global pool: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::board::{
        default_mr_x_tickets, demo_setup, Detective, LogEntry, Piece, Player, Ticket,
        DEFAULT_DETECTIVE_TICKETS,
    };

    const RED: Piece = Piece::Detective(Detective::Red);
    const BLUE: Piece = Piece::Detective(Detective::Blue);

    fn opening() -> Position {
        Position::start(
            Arc::new(demo_setup()),
            Player::new(Piece::MrX, default_mr_x_tickets(2), 13),
            vec![
                Player::new(RED, DEFAULT_DETECTIVE_TICKETS, 2),
                Player::new(BLUE, DEFAULT_DETECTIVE_TICKETS, 19),
            ],
        )
        .unwrap()
    }

    fn quick_config(threads: usize) -> SearchConfig {
        SearchConfig {
            safety_margin: Duration::ZERO,
            max_depth: 2,
            threads,
            ..SearchConfig::default()
        }
    }

    #[test]
    fn picks_a_legal_evader_move() {
        let pos = opening();
        let snap = pos.observe(Piece::MrX);
        let mut out = Vec::new();
        let result =
            pick_move(&snap, Duration::from_secs(30), &quick_config(1), None, &mut out).unwrap();
        assert!(pos.is_legal(&result.best_move));
        assert_eq!(result.depth, Some(2));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("info depth 0 "));
        assert!(text.contains("info depth 2 "));
    }

    #[test]
    fn avoids_stepping_next_to_a_detective() {
        let pos = opening();
        let snap = pos.observe(Piece::MrX);
        let result =
            pick_move(&snap, Duration::from_secs(30), &quick_config(1), None, &mut Vec::new())
                .unwrap();
        let successor = pos.advance(&result.best_move).unwrap();
        assert!(!walks_into_capture(
            &successor,
            result.best_move.final_destination()
        ));
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let snap = opening().observe(Piece::MrX);
        let a = pick_move(&snap, Duration::from_secs(30), &quick_config(1), None, &mut Vec::new())
            .unwrap();
        let b = pick_move(&snap, Duration::from_secs(30), &quick_config(2), None, &mut Vec::new())
            .unwrap();
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn detectives_pick_their_own_move() {
        let pos = opening();
        let mv = pos
            .legal_moves()
            .iter()
            .find(|m| m.final_destination() == 20)
            .copied()
            .unwrap();
        let pos = pos.advance(&mv).unwrap();
        let snap = pos.observe(RED);
        let result =
            pick_move(&snap, Duration::from_secs(30), &quick_config(1), None, &mut Vec::new())
                .unwrap();
        assert!(!result.best_move.commenced_by().is_mr_x());
        assert!(pos.is_legal(&result.best_move));
    }

    #[test]
    fn detectives_keep_deepening_past_a_stale_reveal() {
        // The evader was seen at 7 and has since moved on; red now stands on 7.
        let log = vec![
            LogEntry::Hidden {
                ticket: Ticket::Taxi,
            },
            LogEntry::Hidden {
                ticket: Ticket::Taxi,
            },
            LogEntry::Revealed {
                ticket: Ticket::Taxi,
                location: 7,
            },
        ];
        let pos = Position::new(
            Arc::new(demo_setup()),
            Player::new(Piece::MrX, default_mr_x_tickets(2), 13),
            vec![
                Player::new(RED, DEFAULT_DETECTIVE_TICKETS, 7),
                Player::new(BLUE, DEFAULT_DETECTIVE_TICKETS, 19),
            ],
            [BLUE].into_iter().collect(),
            log,
        )
        .unwrap();
        let snap = pos.observe(BLUE);
        assert_eq!(snap.whereabouts(), Whereabouts::Unknown);

        let mut out = Vec::new();
        let result =
            pick_move(&snap, Duration::from_secs(60), &quick_config(1), None, &mut out).unwrap();
        assert_eq!(result.best_move.commenced_by(), BLUE);
        assert_eq!(result.depth, Some(2));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("info depth 2 "), "{}", text);
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let mut snap = opening().observe(Piece::MrX);
        snap.legal_moves.clear();
        let err = pick_move(&snap, Duration::from_secs(1), &quick_config(1), None, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, SearchError::NoLegalMoves));
    }

    #[test]
    fn tiny_budget_falls_back_to_a_legal_move() {
        let pos = opening();
        let snap = pos.observe(Piece::MrX);
        let config = SearchConfig {
            threads: 1,
            ..SearchConfig::default()
        };
        let start = Instant::now();
        let result =
            pick_move(&snap, Duration::from_millis(1), &config, None, &mut Vec::new()).unwrap();
        assert!(pos.is_legal(&result.best_move));
        assert!(start.elapsed() < Duration::from_millis(1) + config.safety_margin);
    }

    #[test]
    fn select_breaks_ties_by_first() {
        assert_eq!(select(&[1.0, 3.0, 3.0], true), (1, 3.0));
        assert_eq!(select(&[2.0, -1.0, -1.0], false), (1, -1.0));
        assert_eq!(select(&[f64::NEG_INFINITY, f64::NEG_INFINITY], true).0, 0);
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(f64::INFINITY), "win");
        assert_eq!(format_score(f64::NEG_INFINITY), "loss");
        assert_eq!(format_score(-12.6), "-13");
    }
}
