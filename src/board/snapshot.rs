//! Observable board handed to an agent once per turn.

use std::sync::Arc;

use super::graph::Location;
use super::moves::{LogEntry, Move, Whereabouts};
use super::piece::{Piece, PieceSet, Player};
use super::setup::GameSetup;
use super::ticket::TicketBoard;

/// Read-only view of the board supplied by the rules authority.
///
/// `mr_x_location` is `None` whenever the viewer is not entitled to see it.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub setup: Arc<GameSetup>,
    pub mr_x_tickets: TicketBoard,
    pub mr_x_location: Option<Location>,
    pub detectives: Vec<Player>,
    pub log: Vec<LogEntry>,
    pub legal_moves: Vec<Move>,
    pub winner: PieceSet,
}

impl BoardSnapshot {
    /// True if the evader commences any of the legal moves.
    pub fn mr_x_to_move(&self) -> bool {
        self.legal_moves.iter().any(|m| m.commenced_by() == Piece::MrX)
    }

    /// Best available knowledge of the evader's location: exact when the
    /// viewer is the evader, otherwise the last reveal in the log. A reveal a
    /// detective now stands on is stale, so the location counts as unknown.
    pub fn whereabouts(&self) -> Whereabouts {
        match self.mr_x_location {
            Some(l) => Whereabouts::Known(l),
            None => match Whereabouts::from_log(&self.log) {
                Whereabouts::Known(l) if self.detectives.iter().any(|d| d.location == l) => {
                    Whereabouts::Unknown
                }
                w => w,
            },
        }
    }
}
