//! Static game setup: the map plus the evader's reveal schedule.

use super::graph::Graph;
use super::ticket::TicketBoard;

/// Starting tickets for the evader in the classic rules. The secret-ticket
/// count is conventionally the number of detectives.
pub const fn default_mr_x_tickets(detectives: usize) -> TicketBoard {
    TicketBoard::new(4, 3, 3, 2, detectives as u8)
}

/// Starting tickets for each detective in the classic rules.
pub const DEFAULT_DETECTIVE_TICKETS: TicketBoard = TicketBoard::new(11, 8, 4, 0, 0);

/// Moves on which the evader surfaces in the classic 24-move game (1-based).
pub const CLASSIC_REVEAL_MOVES: [usize; 5] = [3, 8, 13, 18, 24];

/// Length of the classic game in evader moves.
pub const CLASSIC_GAME_LENGTH: usize = 24;

/// The immutable part of a game: graph and reveal schedule.
///
/// `reveals[i]` says whether the evader's `i`-th move (0-based) is shown in
/// the travel log; its length is the maximum number of evader moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub graph: Graph,
    pub reveals: Vec<bool>,
}

impl GameSetup {
    pub fn new(graph: Graph, reveals: Vec<bool>) -> Self {
        GameSetup { graph, reveals }
    }

    /// Total evader moves in the game.
    #[inline]
    pub fn max_moves(&self) -> usize {
        self.reveals.len()
    }

    /// Whether the evader move with the given 0-based index is revealed.
    /// Out-of-range indices are treated as hidden.
    #[inline]
    pub fn is_reveal(&self, move_index: usize) -> bool {
        self.reveals.get(move_index).copied().unwrap_or(false)
    }
}

/// Builds the classic 24-move reveal schedule.
pub fn classic_reveals() -> Vec<bool> {
    (1..=CLASSIC_GAME_LENGTH)
        .map(|m| CLASSIC_REVEAL_MOVES.contains(&m))
        .collect()
}
