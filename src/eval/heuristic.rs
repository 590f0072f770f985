//! Heuristic position evaluation.
//!
//! Scores a position from the evader's perspective (higher is better for the
//! evader) using pursuer distances, the evader's special tickets, and
//! mobility. When the evader's location is unknown the score measures how
//! well the detectives cover the board instead.

use crate::board::{Location, Position, Ticket, Whereabouts};

use super::distance::{DistanceTable, UNREACHABLE};

/// Tunable evaluation weights.
pub mod weights {
    /// Per secret ticket the evader still holds.
    pub const SECRET_TICKET_BONUS: f64 = 1.0;

    /// Per double-move ticket the evader still holds.
    pub const DOUBLE_TICKET_BONUS: f64 = 0.5;

    /// Scale applied to the summed pursuer-distance term.
    pub const DISTANCE_WEIGHT: f64 = 1.0;

    /// Scale applied to each logarithmic distance.
    pub const LOG_DISTANCE_WEIGHT: f64 = 20.0;

    /// Scale applied to each logarithmic distance between two detectives
    /// when the evader's location is unknown.
    pub const SPREAD_WEIGHT: f64 = 20.0;

    /// Divisor inside the logarithm; distances below `DISTANCE_SCALE + 1`
    /// produce a negative contribution.
    pub const DISTANCE_SCALE: f64 = 3.5;

    /// Extra weight on pursuers within `SAFE_DISTANCE` hops.
    pub const DANGER_MULTIPLIER: f64 = 15.0;

    /// Pursuers farther than this many hops are weighted normally. Kept at or
    /// below `DISTANCE_SCALE + 1` so the heavy weight only ever lands on
    /// non-positive terms and the score stays monotone in distance.
    pub const SAFE_DISTANCE: u32 = 4;

    /// Per legal move available in the scored position.
    pub const AVAILABLE_MOVES_BONUS: f64 = 0.4;

    /// Stand-in hop count for unreachable pairs.
    pub const UNREACHABLE_HOPS: u32 = 64;
}

use weights::*;

/// Scores `position` from the evader's perspective.
///
/// `depth` is the remaining search depth at which the leaf is scored; closer
/// pursuers matter more the more plies are still to come.
pub fn evaluate(
    position: &Position,
    whereabouts: Whereabouts,
    depth: u32,
    table: &DistanceTable,
) -> f64 {
    match whereabouts {
        Whereabouts::Unknown => -coverage_score(position, table),
        Whereabouts::Known(location) => known_score(position, location, depth, table),
    }
}

/// Score when the evader's location is assumed known.
fn known_score(position: &Position, location: Location, depth: u32, table: &DistanceTable) -> f64 {
    let hops: Vec<u32> = position
        .detectives()
        .iter()
        .map(|d| table.distance(location, d.location))
        .collect();
    let mut score = distance_score(&hops, depth);

    let tickets = position.mr_x().tickets;
    score += f64::from(tickets.count(Ticket::Secret)) * SECRET_TICKET_BONUS;
    score += f64::from(tickets.count(Ticket::Double)) * DOUBLE_TICKET_BONUS;

    let mobility = position.legal_moves().len() as f64 * AVAILABLE_MOVES_BONUS;
    if position.mr_x_to_move() {
        score + mobility
    } else {
        score - mobility
    }
}

/// The pursuer-distance term for the given evader-to-pursuer hop counts.
///
/// Any pursuer within one hop yields negative infinity. Otherwise each
/// distance contributes `ln((d - 1) / DISTANCE_SCALE)`, weighted heavily
/// while within `SAFE_DISTANCE` and scaled by the remaining depth.
pub fn distance_score(hops: &[u32], depth: u32) -> f64 {
    let mut sorted: Vec<u32> = hops.iter().map(|&d| clamp_hops(d)).collect();
    sorted.sort_unstable();

    let depth_factor = f64::from(depth) + 1.0;
    let mut sum = 0.0;
    for d in sorted {
        if d <= 1 {
            return f64::NEG_INFINITY;
        }
        let term = (f64::from(d - 1) / DISTANCE_SCALE).ln() * LOG_DISTANCE_WEIGHT;
        let danger = if d <= SAFE_DISTANCE {
            DANGER_MULTIPLIER
        } else {
            1.0
        };
        sum += depth_factor * danger * term * DISTANCE_WEIGHT;
    }
    sum
}

/// How well the detectives cover the board: their summed pairwise log
/// distances plus their own mobility. Higher is better for the detectives.
fn coverage_score(position: &Position, table: &DistanceTable) -> f64 {
    let detectives = position.detectives();
    let mut spread = 0.0;
    for a in detectives {
        for b in detectives {
            if a.piece == b.piece {
                continue;
            }
            let d = clamp_hops(table.distance(a.location, b.location)).max(1);
            spread += f64::from(d).ln() * SPREAD_WEIGHT;
        }
    }
    spread + position.legal_moves().len() as f64 * AVAILABLE_MOVES_BONUS
}

#[inline]
fn clamp_hops(d: u32) -> u32 {
    if d == UNREACHABLE {
        UNREACHABLE_HOPS
    } else {
        d.min(UNREACHABLE_HOPS)
    }
}

/// True if, in `successor`, some detective already has a legal move onto
/// `destination`. Used to reject evader moves that step straight into a trap.
pub fn walks_into_capture(successor: &Position, destination: Location) -> bool {
    successor
        .legal_moves()
        .iter()
        .any(|m| !m.commenced_by().is_mr_x() && m.final_destination() == destination)
}
