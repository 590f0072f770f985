//! Time-bounded negamax with alpha-beta pruning.
//!
//! Scores are always from the perspective of the side to move in the node
//! being searched: the evader when it is owed a move, the detectives
//! otherwise. Several detectives move in a row within one round, so the sign
//! only flips when the next node belongs to the other side.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::board::{Move, Piece, Position, Whereabouts};
use crate::eval::{evaluate, DistanceTable};

use super::tt::TranspositionTable;

/// Shared, read-mostly state for one decision.
pub struct SearchContext<'a> {
    pub deadline: Instant,
    pub safety_margin: Duration,
    pub table: &'a DistanceTable,
    pub tt: &'a TranspositionTable,
    /// Children searched per node after ordering; `None` searches all.
    pub max_branching: Option<usize>,
    timed_out: AtomicBool,
    nodes: AtomicU64,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        deadline: Instant,
        safety_margin: Duration,
        table: &'a DistanceTable,
        tt: &'a TranspositionTable,
    ) -> Self {
        SearchContext {
            deadline,
            safety_margin,
            table,
            tt,
            max_branching: None,
            timed_out: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
        }
    }

    pub fn with_max_branching(mut self, max_branching: Option<usize>) -> Self {
        self.max_branching = max_branching;
        self
    }

    /// True once less than the safety margin remains before the deadline.
    pub fn out_of_time(&self) -> bool {
        self.deadline.saturating_duration_since(Instant::now()) < self.safety_margin
    }

    /// True if any node has hit the time cutoff.
    pub fn timed_out(&self) -> bool {
        self.timed_out.load(Ordering::Relaxed)
    }

    /// Nodes visited so far.
    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }
}

/// +1 when the evader is to move, -1 when the detectives are.
#[inline]
fn side_sign(position: &Position) -> f64 {
    if position.mr_x_to_move() {
        1.0
    } else {
        -1.0
    }
}

/// Searches `position` to `depth` plies within the window `(alpha, beta)`.
///
/// A node reached with less than the safety margin left scores negative
/// infinity for its side to move and marks the context as timed out; callers
/// must discard any result produced after that.
pub fn search(
    ctx: &SearchContext,
    position: &Position,
    depth: u32,
    mut alpha: f64,
    beta: f64,
    whereabouts: Whereabouts,
) -> f64 {
    ctx.nodes.fetch_add(1, Ordering::Relaxed);
    let sign = side_sign(position);

    if ctx.out_of_time() {
        ctx.timed_out.store(true, Ordering::Relaxed);
        return f64::NEG_INFINITY;
    }

    let winner = position.winner();
    if !winner.is_empty() {
        let evader_won = winner.contains(Piece::MrX);
        return if evader_won {
            sign * f64::INFINITY
        } else {
            -sign * f64::INFINITY
        };
    }

    if depth == 0 {
        return sign * evaluate(position, whereabouts, depth, ctx.table);
    }

    let mut children = expand(position);
    if children.is_empty() {
        return sign * evaluate(position, whereabouts, depth, ctx.table);
    }
    order_children(ctx, position, &mut children);
    if let Some(limit) = ctx.max_branching {
        children.truncate(limit.max(1));
    }

    let mut best = f64::NEG_INFINITY;
    for (mv, child) in &children {
        let next = whereabouts.after(mv);
        let value = if child.mr_x_to_move() == position.mr_x_to_move() {
            search(ctx, child, depth - 1, alpha, beta, next)
        } else {
            -search(ctx, child, depth - 1, -beta, -alpha, next)
        };

        best = best.max(value);
        alpha = alpha.max(best);
        if alpha >= beta || ctx.timed_out() {
            break;
        }
    }

    if !ctx.timed_out() {
        ctx.tt.insert(position.key(), best);
    }
    best
}

/// Every legal successor of `position`, in legal-move order.
fn expand(position: &Position) -> Vec<(Move, Position)> {
    position
        .legal_moves()
        .iter()
        .filter_map(|mv| position.advance(mv).ok().map(|child| (*mv, child)))
        .collect()
}

/// Puts children with a remembered score first, best for the mover first.
/// The sort is stable, so unknown children keep legal-move order.
fn order_children(ctx: &SearchContext, position: &Position, children: &mut [(Move, Position)]) {
    let keys: Vec<Option<f64>> = children
        .iter()
        .map(|(_, child)| {
            ctx.tt.get(&child.key()).map(|s| {
                if child.mr_x_to_move() == position.mr_x_to_move() {
                    s
                } else {
                    -s
                }
            })
        })
        .collect();
    if keys.iter().all(Option::is_none) {
        return;
    }

    let mut indexed: Vec<(Option<f64>, usize)> = keys.into_iter().zip(0..).collect();
    indexed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let reordered: Vec<(Move, Position)> = indexed
        .iter()
        .map(|&(_, i)| children[i].clone())
        .collect();
    children.clone_from_slice(&reordered);
}
