//! Tickets, transport modes, and per-player ticket inventories.
//!
//! Every edge of the map carries one or more transport modes, and moving
//! along an edge consumes the ticket that mode requires. The evader also
//! holds two special tickets: a secret ticket that stands in for any mode
//! (and is the only way across a ferry), and a double-move ticket.

use serde::{Deserialize, Serialize};

/// A consumable travel credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ticket {
    Taxi,
    Bus,
    Underground,
    Double,
    Secret,
}

/// Number of ticket kinds.
pub const TICKET_COUNT: usize = 5;

/// All ticket kinds in inventory order.
pub const ALL_TICKETS: [Ticket; TICKET_COUNT] = [
    Ticket::Taxi,
    Ticket::Bus,
    Ticket::Underground,
    Ticket::Double,
    Ticket::Secret,
];

impl Ticket {
    /// Returns the single-character notation abbreviation.
    pub const fn notation_char(self) -> char {
        match self {
            Ticket::Taxi => 't',
            Ticket::Bus => 'b',
            Ticket::Underground => 'u',
            Ticket::Double => 'd',
            Ticket::Secret => 's',
        }
    }

    /// Parses a ticket from its single-character notation abbreviation.
    pub fn from_notation_char(c: char) -> Option<Ticket> {
        match c {
            't' => Some(Ticket::Taxi),
            'b' => Some(Ticket::Bus),
            'u' => Some(Ticket::Underground),
            'd' => Some(Ticket::Double),
            's' => Some(Ticket::Secret),
            _ => None,
        }
    }

    /// Returns true for the evader-only tickets.
    pub const fn is_special(self) -> bool {
        matches!(self, Ticket::Double | Ticket::Secret)
    }
}

/// A transport mode labelling an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Taxi,
    Bus,
    Underground,
    Ferry,
}

impl Transport {
    /// The ticket a player must spend to travel by this mode.
    pub const fn required_ticket(self) -> Ticket {
        match self {
            Transport::Taxi => Ticket::Taxi,
            Transport::Bus => Ticket::Bus,
            Transport::Underground => Ticket::Underground,
            Transport::Ferry => Ticket::Secret,
        }
    }
}

/// Ticket counts for one player, indexed by `Ticket as usize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TicketBoard {
    counts: [u8; TICKET_COUNT],
}

impl TicketBoard {
    /// Creates an inventory from explicit counts.
    pub const fn new(taxi: u8, bus: u8, underground: u8, double: u8, secret: u8) -> Self {
        TicketBoard {
            counts: [taxi, bus, underground, double, secret],
        }
    }

    /// Number of tickets of the given kind.
    #[inline]
    pub fn count(&self, ticket: Ticket) -> u8 {
        self.counts[ticket as usize]
    }

    #[inline]
    pub fn has(&self, ticket: Ticket) -> bool {
        self.count(ticket) > 0
    }

    #[inline]
    pub fn has_at_least(&self, ticket: Ticket, n: u8) -> bool {
        self.count(ticket) >= n
    }

    /// True if both legs of a two-ticket sequence can be paid for.
    /// The same kind twice needs two of it; differing kinds need one each.
    pub fn can_afford_pair(&self, first: Ticket, second: Ticket) -> bool {
        if first == second {
            self.has_at_least(first, 2)
        } else {
            self.has(first) && self.has(second)
        }
    }

    /// Returns a copy with one ticket of the given kind removed.
    pub fn use_ticket(self, ticket: Ticket) -> Self {
        let mut counts = self.counts;
        counts[ticket as usize] = counts[ticket as usize].saturating_sub(1);
        TicketBoard { counts }
    }

    /// Returns a copy with one ticket of the given kind added.
    pub fn give(self, ticket: Ticket) -> Self {
        let mut counts = self.counts;
        counts[ticket as usize] = counts[ticket as usize].saturating_add(1);
        TicketBoard { counts }
    }

    /// Returns a copy with the count for one kind replaced.
    pub fn with_count(self, ticket: Ticket, count: u8) -> Self {
        let mut counts = self.counts;
        counts[ticket as usize] = count;
        TicketBoard { counts }
    }

    /// Total tickets held.
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_notation_roundtrip() {
        for t in ALL_TICKETS {
            assert_eq!(Ticket::from_notation_char(t.notation_char()), Some(t));
        }
        assert_eq!(Ticket::from_notation_char('x'), None);
    }

    #[test]
    fn ferry_requires_secret() {
        assert_eq!(Transport::Ferry.required_ticket(), Ticket::Secret);
        assert_eq!(Transport::Bus.required_ticket(), Ticket::Bus);
    }

    #[test]
    fn use_and_give_are_pure() {
        let board = TicketBoard::new(2, 1, 0, 0, 0);
        let used = board.use_ticket(Ticket::Taxi);
        assert_eq!(board.count(Ticket::Taxi), 2);
        assert_eq!(used.count(Ticket::Taxi), 1);
        let given = used.give(Ticket::Underground);
        assert_eq!(given.count(Ticket::Underground), 1);
        assert_eq!(used.count(Ticket::Underground), 0);
    }

    #[test]
    fn use_ticket_never_underflows() {
        let board = TicketBoard::default().use_ticket(Ticket::Bus);
        assert_eq!(board.count(Ticket::Bus), 0);
    }

    #[test]
    fn pair_affordability() {
        let one_taxi = TicketBoard::new(1, 1, 0, 0, 0);
        assert!(!one_taxi.can_afford_pair(Ticket::Taxi, Ticket::Taxi));
        assert!(one_taxi.can_afford_pair(Ticket::Taxi, Ticket::Bus));
        assert!(!one_taxi.can_afford_pair(Ticket::Taxi, Ticket::Underground));
        let two_secret = TicketBoard::new(0, 0, 0, 0, 2);
        assert!(two_secret.can_afford_pair(Ticket::Secret, Ticket::Secret));
    }

    #[test]
    fn special_tickets() {
        assert!(Ticket::Double.is_special());
        assert!(Ticket::Secret.is_special());
        assert!(!Ticket::Taxi.is_special());
    }
}
