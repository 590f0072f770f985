//! Player identities and per-player state.

use serde::{Deserialize, Serialize};

use super::graph::Location;
use super::ticket::{Ticket, TicketBoard};

/// The colour of a detective piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Detective {
    Red,
    Green,
    Blue,
    White,
    Yellow,
}

/// All detective colours in seating order.
pub const ALL_DETECTIVES: [Detective; 5] = [
    Detective::Red,
    Detective::Green,
    Detective::Blue,
    Detective::White,
    Detective::Yellow,
];

/// A player identity: the evader or one of the detectives.
///
/// Serialized by lowercase name (`"mrx"`, `"red"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Piece {
    MrX,
    Detective(Detective),
}

impl Piece {
    #[inline]
    pub const fn is_mr_x(self) -> bool {
        matches!(self, Piece::MrX)
    }

    /// Returns the lowercase name of this piece.
    pub const fn name(self) -> &'static str {
        match self {
            Piece::MrX => "mrx",
            Piece::Detective(Detective::Red) => "red",
            Piece::Detective(Detective::Green) => "green",
            Piece::Detective(Detective::Blue) => "blue",
            Piece::Detective(Detective::White) => "white",
            Piece::Detective(Detective::Yellow) => "yellow",
        }
    }

    /// Returns the single-character protocol abbreviation.
    pub const fn notation_char(self) -> char {
        match self {
            Piece::MrX => 'X',
            Piece::Detective(Detective::Red) => 'R',
            Piece::Detective(Detective::Green) => 'G',
            Piece::Detective(Detective::Blue) => 'B',
            Piece::Detective(Detective::White) => 'W',
            Piece::Detective(Detective::Yellow) => 'Y',
        }
    }

    /// Parses a piece from its lowercase name.
    pub fn from_name(name: &str) -> Option<Piece> {
        match name {
            "mrx" => Some(Piece::MrX),
            "red" => Some(Piece::Detective(Detective::Red)),
            "green" => Some(Piece::Detective(Detective::Green)),
            "blue" => Some(Piece::Detective(Detective::Blue)),
            "white" => Some(Piece::Detective(Detective::White)),
            "yellow" => Some(Piece::Detective(Detective::Yellow)),
            _ => None,
        }
    }

    /// Parses a piece from its single-character protocol abbreviation.
    pub fn from_notation_char(c: char) -> Option<Piece> {
        match c {
            'X' => Some(Piece::MrX),
            'R' => Some(Piece::Detective(Detective::Red)),
            'G' => Some(Piece::Detective(Detective::Green)),
            'B' => Some(Piece::Detective(Detective::Blue)),
            'W' => Some(Piece::Detective(Detective::White)),
            'Y' => Some(Piece::Detective(Detective::Yellow)),
            _ => None,
        }
    }

    /// Bit used for this piece in compact piece sets.
    pub(crate) const fn bit(self) -> u8 {
        match self {
            Piece::MrX => 1,
            Piece::Detective(d) => 1 << (d as u8 + 1),
        }
    }
}

impl TryFrom<String> for Piece {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Piece::from_name(&name).ok_or_else(|| format!("unknown piece '{}'", name))
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> String {
        piece.name().to_string()
    }
}

/// A compact set of pieces, iterated evader first then detectives in
/// seating order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceSet(u8);

impl PieceSet {
    pub const EMPTY: PieceSet = PieceSet(0);

    /// The set holding only the evader.
    pub const fn mr_x() -> Self {
        PieceSet(Piece::MrX.bit())
    }

    pub fn insert(&mut self, piece: Piece) {
        self.0 |= piece.bit();
    }

    /// Returns a copy without the given piece.
    pub fn without(self, piece: Piece) -> Self {
        PieceSet(self.0 & !piece.bit())
    }

    #[inline]
    pub fn contains(&self, piece: Piece) -> bool {
        self.0 & piece.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Raw bit pattern, stable across runs.
    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Piece> + '_ {
        std::iter::once(Piece::MrX)
            .chain(ALL_DETECTIVES.iter().map(|&d| Piece::Detective(d)))
            .filter(move |p| self.contains(*p))
    }
}

impl FromIterator<Piece> for PieceSet {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        let mut set = PieceSet::EMPTY;
        for p in iter {
            set.insert(p);
        }
        set
    }
}

/// A player on the board. All updates return a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Player {
    pub piece: Piece,
    pub tickets: TicketBoard,
    pub location: Location,
}

impl Player {
    pub const fn new(piece: Piece, tickets: TicketBoard, location: Location) -> Self {
        Player {
            piece,
            tickets,
            location,
        }
    }

    #[inline]
    pub fn has(&self, ticket: Ticket) -> bool {
        self.tickets.has(ticket)
    }

    /// Returns this player with one ticket spent.
    pub fn use_ticket(self, ticket: Ticket) -> Self {
        Player {
            tickets: self.tickets.use_ticket(ticket),
            ..self
        }
    }

    /// Returns this player with one ticket received.
    pub fn give(self, ticket: Ticket) -> Self {
        Player {
            tickets: self.tickets.give(ticket),
            ..self
        }
    }

    /// Returns this player relocated.
    pub fn at(self, location: Location) -> Self {
        Player { location, ..self }
    }
}
