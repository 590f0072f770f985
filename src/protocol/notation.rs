//! Compact move notation.
//!
//! A move is written as the mover's piece letter followed by one or two legs,
//! each a ticket letter and a destination: `X t46`, `R u13`, or for a double
//! move `X s46/b58`. The source location is implied by the position, so
//! parsing resolves the notation against a list of legal moves.

use thiserror::Error;

use crate::board::{Location, Move, Piece, Ticket};

/// Errors that can occur when parsing move notation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty input")]
    EmptyInput,

    #[error("unknown piece '{0}'")]
    UnknownPiece(String),

    #[error("unknown ticket '{0}'")]
    UnknownTicket(String),

    #[error("invalid destination '{0}'")]
    InvalidDestination(String),

    #[error("expected one or two legs, got {0}")]
    LegCount(usize),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("move '{0}' is not legal here")]
    NotLegal(String),
}

/// A parsed move before its source location is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNotation {
    pub piece: Piece,
    pub legs: Vec<(Ticket, Location)>,
}

impl MoveNotation {
    /// True if `mv` is the move this notation describes.
    pub fn matches(&self, mv: &Move) -> bool {
        match (*mv, self.legs.as_slice()) {
            (
                Move::Single {
                    piece,
                    ticket,
                    destination,
                    ..
                },
                &[(t, d)],
            ) => piece == self.piece && ticket == t && destination == d,
            (
                Move::Double {
                    piece,
                    ticket1,
                    destination1,
                    ticket2,
                    destination2,
                    ..
                },
                &[(t1, d1), (t2, d2)],
            ) => {
                piece == self.piece
                    && ticket1 == t1
                    && destination1 == d1
                    && ticket2 == t2
                    && destination2 == d2
            }
            _ => false,
        }
    }
}

/// Parses notation text without resolving it.
pub fn parse_notation(s: &str) -> Result<MoveNotation, NotationError> {
    let mut tokens = s.split_whitespace();
    let piece_token = tokens.next().ok_or(NotationError::EmptyInput)?;
    let legs_token = tokens
        .next()
        .ok_or_else(|| NotationError::LegCount(0))?;
    if let Some(extra) = tokens.next() {
        return Err(NotationError::UnexpectedToken(extra.to_string()));
    }

    let piece = single_char(piece_token)
        .and_then(Piece::from_notation_char)
        .ok_or_else(|| NotationError::UnknownPiece(piece_token.to_string()))?;

    let legs = legs_token
        .split('/')
        .map(parse_leg)
        .collect::<Result<Vec<_>, _>>()?;
    if legs.is_empty() || legs.len() > 2 {
        return Err(NotationError::LegCount(legs.len()));
    }

    Ok(MoveNotation { piece, legs })
}

/// Parses notation and resolves it against `legal`.
pub fn parse_move(s: &str, legal: &[Move]) -> Result<Move, NotationError> {
    let notation = parse_notation(s)?;
    legal
        .iter()
        .find(|m| notation.matches(m))
        .copied()
        .ok_or_else(|| NotationError::NotLegal(s.trim().to_string()))
}

/// Formats a move in compact notation.
pub fn format_move(mv: &Move) -> String {
    match *mv {
        Move::Single {
            piece,
            ticket,
            destination,
            ..
        } => format!(
            "{} {}{}",
            piece.notation_char(),
            ticket.notation_char(),
            destination
        ),
        Move::Double {
            piece,
            ticket1,
            destination1,
            ticket2,
            destination2,
            ..
        } => format!(
            "{} {}{}/{}{}",
            piece.notation_char(),
            ticket1.notation_char(),
            destination1,
            ticket2.notation_char(),
            destination2
        ),
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn parse_leg(leg: &str) -> Result<(Ticket, Location), NotationError> {
    let mut chars = leg.chars();
    let ticket_char = chars
        .next()
        .ok_or_else(|| NotationError::UnknownTicket(String::new()))?;
    let ticket = Ticket::from_notation_char(ticket_char)
        .filter(|t| *t != Ticket::Double)
        .ok_or_else(|| NotationError::UnknownTicket(ticket_char.to_string()))?;
    let rest = chars.as_str();
    let destination = rest
        .parse::<Location>()
        .map_err(|_| NotationError::InvalidDestination(rest.to_string()))?;
    Ok((ticket, destination))
}
