//! Immutable game position.
//!
//! Holds the complete hidden-information state of a game at one point in
//! time: every player's location and tickets, whose moves are still owed this
//! round, and the evader's travel log. Legal moves and the winner are computed
//! once at construction. A `Position` is never modified after it is built;
//! `advance` (see `resolve`) returns a new one.

use std::sync::Arc;

use super::graph::Location;
use super::moves::{LogEntry, Move};
use super::piece::{Piece, PieceSet, Player};
use super::setup::GameSetup;
use super::snapshot::BoardSnapshot;
use super::ticket::{Ticket, TicketBoard};
use crate::movegen::legal_moves;
use crate::resolve::winner;

/// Errors raised when building or advancing a position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("illegal move: {0:?}")]
    IllegalMove(Move),

    #[error("malformed position: the move schedule is empty")]
    EmptySchedule,

    #[error("malformed position: the graph has no nodes")]
    EmptyGraph,

    #[error("malformed position: expected the evader, got {0:?}")]
    NotMrX(Piece),

    #[error("malformed position: detective slot holds the evader")]
    EvaderAsDetective,

    #[error("malformed position: duplicate piece {0:?}")]
    DuplicatePiece(Piece),

    #[error("malformed position: detectives overlap at location {0}")]
    OverlappingDetectives(Location),

    #[error("malformed position: {piece:?} holds forbidden {ticket:?} tickets")]
    ForbiddenTicket { piece: Piece, ticket: Ticket },

    #[error("malformed position: {piece:?} stands on unknown location {location}")]
    UnknownLocation { piece: Piece, location: Location },

    #[error("malformed position: {0:?} is owed a move but is not in the game")]
    UnknownPiece(Piece),
}

/// Structural key identifying a position for the transposition table.
///
/// Built only from game content, so equal positions always produce equal keys
/// regardless of thread or process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    mr_x: (Location, TicketBoard),
    detectives: Vec<(Location, TicketBoard)>,
    remaining: u8,
    log_len: u16,
}

/// Complete game state at a point in time.
#[derive(Debug, Clone)]
pub struct Position {
    pub(crate) setup: Arc<GameSetup>,
    pub(crate) mr_x: Player,
    pub(crate) detectives: Vec<Player>,
    pub(crate) remaining: PieceSet,
    pub(crate) log: Vec<LogEntry>,
    moves: Vec<Move>,
    winner: PieceSet,
}

impl Position {
    /// Builds a validated position.
    pub fn new(
        setup: Arc<GameSetup>,
        mr_x: Player,
        detectives: Vec<Player>,
        remaining: PieceSet,
        log: Vec<LogEntry>,
    ) -> Result<Self, PositionError> {
        validate(&setup, &mr_x, &detectives, remaining)?;
        Ok(Self::assemble(setup, mr_x, detectives, remaining, log))
    }

    /// The opening position: the evader moves first with an empty log.
    pub fn start(
        setup: Arc<GameSetup>,
        mr_x: Player,
        detectives: Vec<Player>,
    ) -> Result<Self, PositionError> {
        Self::new(setup, mr_x, detectives, PieceSet::mr_x(), Vec::new())
    }

    /// Builds a position from parts already known to satisfy the invariants,
    /// computing legal moves and the winner.
    pub(crate) fn assemble(
        setup: Arc<GameSetup>,
        mr_x: Player,
        detectives: Vec<Player>,
        remaining: PieceSet,
        log: Vec<LogEntry>,
    ) -> Self {
        let winner = winner(&setup, &mr_x, &detectives, remaining, log.len());
        let moves = if winner.is_empty() {
            legal_moves(&setup, &mr_x, &detectives, remaining, log.len())
        } else {
            Vec::new()
        };
        Position {
            setup,
            mr_x,
            detectives,
            remaining,
            log,
            moves,
            winner,
        }
    }

    /// Builds the full-information copy of an observed board.
    ///
    /// When the evader's location is hidden, the most recently revealed
    /// location stands in for it, or failing that the lowest-numbered
    /// location no detective occupies. A stand-in is never a detective's
    /// location. The pieces still owed a move are the
    /// ones commencing the snapshot's legal moves (the evader alone if it has
    /// any, or if nobody does).
    pub fn from_snapshot(snapshot: &BoardSnapshot) -> Result<Self, PositionError> {
        let location = match snapshot.mr_x_location {
            Some(l) => l,
            None => stand_in_location(&snapshot.setup, &snapshot.detectives, &snapshot.log),
        };
        let mr_x = Player::new(Piece::MrX, snapshot.mr_x_tickets, location);

        let movers: PieceSet = snapshot.legal_moves.iter().map(|m| m.commenced_by()).collect();
        let remaining = if movers.is_empty() || movers.contains(Piece::MrX) {
            PieceSet::mr_x()
        } else {
            movers
        };

        Self::new(
            Arc::clone(&snapshot.setup),
            mr_x,
            snapshot.detectives.clone(),
            remaining,
            snapshot.log.clone(),
        )
    }

    /// What `viewer` may see of this position. Detectives only learn the
    /// evader's location through the travel log.
    pub fn observe(&self, viewer: Piece) -> BoardSnapshot {
        BoardSnapshot {
            setup: Arc::clone(&self.setup),
            mr_x_tickets: self.mr_x.tickets,
            mr_x_location: viewer.is_mr_x().then_some(self.mr_x.location),
            detectives: self.detectives.clone(),
            log: self.log.clone(),
            legal_moves: self.moves.clone(),
            winner: self.winner,
        }
    }

    /// Returns this position with a different set of pieces owed a move.
    pub(crate) fn with_remaining(&self, remaining: PieceSet) -> Self {
        Self::assemble(
            Arc::clone(&self.setup),
            self.mr_x,
            self.detectives.clone(),
            remaining,
            self.log.clone(),
        )
    }

    #[inline]
    pub fn setup(&self) -> &GameSetup {
        &self.setup
    }

    /// Shared handle to the setup.
    pub fn shared_setup(&self) -> Arc<GameSetup> {
        Arc::clone(&self.setup)
    }

    #[inline]
    pub fn mr_x(&self) -> &Player {
        &self.mr_x
    }

    #[inline]
    pub fn detectives(&self) -> &[Player] {
        &self.detectives
    }

    /// The detective with the given piece, if present.
    pub fn detective(&self, piece: Piece) -> Option<&Player> {
        self.detectives.iter().find(|d| d.piece == piece)
    }

    /// The player with the given piece, if present.
    pub fn player(&self, piece: Piece) -> Option<&Player> {
        if piece.is_mr_x() {
            Some(&self.mr_x)
        } else {
            self.detective(piece)
        }
    }

    /// All pieces in the game, evader first.
    pub fn pieces(&self) -> PieceSet {
        std::iter::once(Piece::MrX)
            .chain(self.detectives.iter().map(|d| d.piece))
            .collect()
    }

    /// Pieces still owed a move this round.
    #[inline]
    pub fn remaining(&self) -> PieceSet {
        self.remaining
    }

    #[inline]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Legal moves for the pieces owed a move, in deterministic order.
    /// Empty once the game is decided.
    #[inline]
    pub fn legal_moves(&self) -> &[Move] {
        &self.moves
    }

    /// True if `mv` is one of this position's legal moves.
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.moves.binary_search(mv).is_ok()
    }

    /// The winning side, empty while the game is undecided.
    #[inline]
    pub fn winner(&self) -> PieceSet {
        self.winner
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        !self.winner.is_empty()
    }

    /// True when the evader is the one to move.
    #[inline]
    pub fn mr_x_to_move(&self) -> bool {
        self.remaining.contains(Piece::MrX)
    }

    /// Evader moves made so far.
    #[inline]
    pub fn moves_made(&self) -> usize {
        self.log.len()
    }

    /// Structural transposition key.
    pub fn key(&self) -> PositionKey {
        PositionKey {
            mr_x: (self.mr_x.location, self.mr_x.tickets),
            detectives: self
                .detectives
                .iter()
                .map(|d| (d.location, d.tickets))
                .collect(),
            remaining: self.remaining.bits(),
            log_len: self.log.len() as u16,
        }
    }
}

/// Checks the construction invariants.
fn validate(
    setup: &GameSetup,
    mr_x: &Player,
    detectives: &[Player],
    remaining: PieceSet,
) -> Result<(), PositionError> {
    if setup.reveals.is_empty() {
        return Err(PositionError::EmptySchedule);
    }
    if setup.graph.is_empty() {
        return Err(PositionError::EmptyGraph);
    }
    if !mr_x.piece.is_mr_x() {
        return Err(PositionError::NotMrX(mr_x.piece));
    }
    if !setup.graph.contains(mr_x.location) {
        return Err(PositionError::UnknownLocation {
            piece: mr_x.piece,
            location: mr_x.location,
        });
    }

    let mut seen = PieceSet::EMPTY;
    for (i, d) in detectives.iter().enumerate() {
        if d.piece.is_mr_x() {
            return Err(PositionError::EvaderAsDetective);
        }
        if seen.contains(d.piece) {
            return Err(PositionError::DuplicatePiece(d.piece));
        }
        seen.insert(d.piece);

        if detectives[..i].iter().any(|o| o.location == d.location) {
            return Err(PositionError::OverlappingDetectives(d.location));
        }
        for ticket in [Ticket::Secret, Ticket::Double] {
            if d.tickets.has(ticket) {
                return Err(PositionError::ForbiddenTicket {
                    piece: d.piece,
                    ticket,
                });
            }
        }
        if !setup.graph.contains(d.location) {
            return Err(PositionError::UnknownLocation {
                piece: d.piece,
                location: d.location,
            });
        }
    }

    seen.insert(Piece::MrX);
    if let Some(stranger) = remaining.iter().find(|p| !seen.contains(*p)) {
        return Err(PositionError::UnknownPiece(stranger));
    }
    Ok(())
}

/// A stand-in evader location for a board that hides it: the most recent
/// reveal, else the lowest-numbered location no detective occupies. A reveal
/// a detective has since stepped onto is skipped so the stand-in is never
/// mistaken for a capture.
pub(crate) fn stand_in_location(
    setup: &GameSetup,
    detectives: &[Player],
    log: &[LogEntry],
) -> Location {
    let free = |n: Location| detectives.iter().all(|d| d.location != n);
    if let Some(l) = log.iter().rev().find_map(|e| e.location()).filter(|&l| free(l)) {
        return l;
    }
    setup
        .graph
        .nodes()
        .find(|&n| free(n))
        .or_else(|| setup.graph.nodes().next())
        .unwrap_or_default()
}
