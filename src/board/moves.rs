//! Moves, travel-log entries, and the evader's known whereabouts.

use serde::{Deserialize, Serialize};

use super::graph::Location;
use super::piece::Piece;
use super::ticket::Ticket;

/// A move by one player.
///
/// Moves compare by value: two moves are equal when they are made by the same
/// piece from the same source with the same tickets and destinations. The
/// derived ordering gives move lists a deterministic iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    /// One hop along an edge.
    Single {
        piece: Piece,
        source: Location,
        ticket: Ticket,
        destination: Location,
    },

    /// Two consecutive hops paid for with one double-move ticket (evader only).
    Double {
        piece: Piece,
        source: Location,
        ticket1: Ticket,
        destination1: Location,
        ticket2: Ticket,
        destination2: Location,
    },
}

impl Move {
    /// The piece making this move.
    pub fn commenced_by(&self) -> Piece {
        match *self {
            Move::Single { piece, .. } | Move::Double { piece, .. } => piece,
        }
    }

    /// Where the moving piece starts.
    pub fn source(&self) -> Location {
        match *self {
            Move::Single { source, .. } | Move::Double { source, .. } => source,
        }
    }

    /// Where the moving piece ends up.
    pub fn final_destination(&self) -> Location {
        match *self {
            Move::Single { destination, .. } => destination,
            Move::Double { destination2, .. } => destination2,
        }
    }

    /// Tickets spent by this move, in order. A double move also spends a
    /// double-move ticket, listed first.
    pub fn tickets(&self) -> Vec<Ticket> {
        match *self {
            Move::Single { ticket, .. } => vec![ticket],
            Move::Double {
                ticket1, ticket2, ..
            } => vec![Ticket::Double, ticket1, ticket2],
        }
    }

    #[inline]
    pub fn is_double(&self) -> bool {
        matches!(self, Move::Double { .. })
    }
}

/// One entry of the evader's travel log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LogEntry {
    /// Only the ticket is disclosed.
    Hidden { ticket: Ticket },
    /// The ticket and the destination are disclosed.
    Revealed { ticket: Ticket, location: Location },
}

impl LogEntry {
    pub fn ticket(&self) -> Ticket {
        match *self {
            LogEntry::Hidden { ticket } | LogEntry::Revealed { ticket, .. } => ticket,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match *self {
            LogEntry::Hidden { .. } => None,
            LogEntry::Revealed { location, .. } => Some(location),
        }
    }
}

/// What a searcher assumes about the evader's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whereabouts {
    Known(Location),
    Unknown,
}

impl Whereabouts {
    /// The most recently revealed location in a travel log, if any.
    pub fn from_log(log: &[LogEntry]) -> Whereabouts {
        log.iter()
            .rev()
            .find_map(|entry| entry.location())
            .map_or(Whereabouts::Unknown, Whereabouts::Known)
    }

    /// The assumption after `mv` is played: an evader move relocates a known
    /// evader; anything else leaves the assumption unchanged.
    pub fn after(self, mv: &Move) -> Whereabouts {
        match self {
            Whereabouts::Known(_) if mv.commenced_by().is_mr_x() => {
                Whereabouts::Known(mv.final_destination())
            }
            other => other,
        }
    }

    pub fn location(self) -> Option<Location> {
        match self {
            Whereabouts::Known(l) => Some(l),
            Whereabouts::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::piece::Detective;

    fn single(piece: Piece, source: Location, ticket: Ticket, destination: Location) -> Move {
        Move::Single {
            piece,
            source,
            ticket,
            destination,
        }
    }

    #[test]
    fn moves_compare_by_value() {
        let a = single(Piece::MrX, 1, Ticket::Taxi, 2);
        let b = single(Piece::MrX, 1, Ticket::Taxi, 2);
        let c = single(Piece::MrX, 1, Ticket::Secret, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn double_move_accessors() {
        let m = Move::Double {
            piece: Piece::MrX,
            source: 1,
            ticket1: Ticket::Taxi,
            destination1: 2,
            ticket2: Ticket::Bus,
            destination2: 9,
        };
        assert_eq!(m.final_destination(), 9);
        assert_eq!(m.source(), 1);
        assert_eq!(m.tickets(), vec![Ticket::Double, Ticket::Taxi, Ticket::Bus]);
        assert!(m.is_double());
    }

    #[test]
    fn whereabouts_from_log_uses_latest_reveal() {
        let log = [
            LogEntry::Revealed {
                ticket: Ticket::Taxi,
                location: 5,
            },
            LogEntry::Hidden {
                ticket: Ticket::Bus,
            },
            LogEntry::Revealed {
                ticket: Ticket::Bus,
                location: 11,
            },
            LogEntry::Hidden {
                ticket: Ticket::Taxi,
            },
        ];
        assert_eq!(Whereabouts::from_log(&log), Whereabouts::Known(11));
        assert_eq!(Whereabouts::from_log(&log[1..2]), Whereabouts::Unknown);
        assert_eq!(Whereabouts::from_log(&[]), Whereabouts::Unknown);
    }

    #[test]
    fn whereabouts_follow_evader_moves_only() {
        let known = Whereabouts::Known(3);
        let evader = single(Piece::MrX, 3, Ticket::Taxi, 4);
        let red = single(Piece::Detective(Detective::Red), 8, Ticket::Taxi, 9);
        assert_eq!(known.after(&evader), Whereabouts::Known(4));
        assert_eq!(known.after(&red), known);
        assert_eq!(Whereabouts::Unknown.after(&evader), Whereabouts::Unknown);
    }

    #[test]
    fn log_entry_serializes_with_kind_tag() {
        let entry = LogEntry::Revealed {
            ticket: Ticket::Underground,
            location: 13,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"kind":"revealed","ticket":"underground","location":13}"#);
        let back: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
