//! Winner determination.

use crate::board::{GameSetup, Piece, PieceSet, Player};
use crate::movegen::has_single_move;

/// Computes the winning side, or an empty set while the game is undecided.
///
/// Rules apply in order, first match wins:
/// 1. A detective stands on the evader's location: detectives win.
/// 2. On the evader's turn, the move schedule is exhausted: the evader wins.
/// 3. On the evader's turn, the evader has no legal move: detectives win.
/// 4. No detective has any legal move: the evader wins.
///
/// A cornered evader is not beaten until its own turn comes round.
pub fn winner(
    setup: &GameSetup,
    mr_x: &Player,
    detectives: &[Player],
    remaining: PieceSet,
    moves_made: usize,
) -> PieceSet {
    let coalition = || detectives.iter().map(|d| d.piece).collect::<PieceSet>();

    if detectives.iter().any(|d| d.location == mr_x.location) {
        return coalition();
    }

    if remaining.contains(Piece::MrX) {
        if moves_made >= setup.max_moves() {
            return PieceSet::mr_x();
        }
        if !has_single_move(&setup.graph, mr_x, detectives) {
            return coalition();
        }
    }

    if !detectives
        .iter()
        .any(|d| has_single_move(&setup.graph, d, detectives))
    {
        return PieceSet::mr_x();
    }

    PieceSet::EMPTY
}
