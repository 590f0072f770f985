//! Legal move generation.
//!
//! Generates the set of legal moves for the pieces still owed a move in a
//! position, covering single hops, secret-ticket substitution, and the
//! evader's double moves.

pub mod movement;

use rand::Rng;

use crate::board::{Move, Position};

pub use movement::{has_single_move, legal_moves, occupied};

/// Picks one legal move uniformly at random, or `None` once the game is over.
pub fn random_move(position: &Position, rng: &mut impl Rng) -> Option<Move> {
    let legal = position.legal_moves();
    if legal.is_empty() {
        return None;
    }
    Some(legal[rng.gen_range(0..legal.len())])
}
