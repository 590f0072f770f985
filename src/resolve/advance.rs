//! Move application.
//!
//! `Position::advance` is the only way a game moves forward. It never touches
//! the receiver: every transition builds fresh player values and a fresh
//! position.

use std::sync::Arc;

use crate::board::{
    Location, LogEntry, Move, Piece, PieceSet, Player, Position, PositionError, Ticket,
};

impl Position {
    /// Applies a legal move and returns the resulting position.
    ///
    /// Fails with `PositionError::IllegalMove` if `mv` is not one of this
    /// position's legal moves.
    pub fn advance(&self, mv: &Move) -> Result<Position, PositionError> {
        if !self.is_legal(mv) {
            return Err(PositionError::IllegalMove(*mv));
        }

        match *mv {
            Move::Single {
                piece,
                ticket,
                destination,
                ..
            } if piece.is_mr_x() => {
                let detectives: PieceSet = self.detectives.iter().map(|d| d.piece).collect();
                Ok(self.evader_hop(self.mr_x, ticket, destination, detectives))
            }
            Move::Single {
                piece,
                ticket,
                destination,
                ..
            } => Ok(self.detective_hop(piece, ticket, destination)),
            Move::Double {
                piece,
                ticket1,
                destination1,
                ticket2,
                destination2,
                ..
            } => {
                // The evader is owed the second leg, so legal moves are
                // re-derived for it before that leg is applied.
                let spent = self.mr_x.use_ticket(Ticket::Double);
                let halfway = self.evader_hop(spent, ticket1, destination1, PieceSet::mr_x());
                halfway.advance(&Move::Single {
                    piece,
                    source: destination1,
                    ticket: ticket2,
                    destination: destination2,
                })
            }
        }
    }

    /// One evader hop starting from `mr_x`: spend the ticket, relocate, and
    /// record it in the log.
    fn evader_hop(
        &self,
        mr_x: Player,
        ticket: Ticket,
        destination: Location,
        remaining: PieceSet,
    ) -> Position {
        let mr_x = mr_x.use_ticket(ticket).at(destination);
        let entry = if self.setup.is_reveal(self.log.len()) {
            LogEntry::Revealed {
                ticket,
                location: destination,
            }
        } else {
            LogEntry::Hidden { ticket }
        };
        let mut log = self.log.clone();
        log.push(entry);
        Position::assemble(
            Arc::clone(&self.setup),
            mr_x,
            self.detectives.clone(),
            remaining,
            log,
        )
    }

    /// One detective hop. The spent ticket goes to the evader, and pieces
    /// that cannot move forfeit their turn.
    fn detective_hop(&self, piece: Piece, ticket: Ticket, destination: Location) -> Position {
        let detectives = self
            .detectives
            .iter()
            .map(|&d| {
                if d.piece == piece {
                    d.use_ticket(ticket).at(destination)
                } else {
                    d
                }
            })
            .collect();
        let mr_x = self.mr_x.give(ticket);

        let mut remaining = self.remaining.without(piece);
        if remaining.is_empty() {
            remaining = PieceSet::mr_x();
        }

        let next = Position::assemble(
            Arc::clone(&self.setup),
            mr_x,
            detectives,
            remaining,
            self.log.clone(),
        );
        if !next.is_game_over() && next.legal_moves().is_empty() && !next.mr_x_to_move() {
            return next.with_remaining(PieceSet::mr_x());
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::board::{
        default_mr_x_tickets, demo_graph, demo_setup, Detective, GameSetup, LogEntry, Move,
        Piece, PieceSet, Player, Position, PositionError, Ticket, TicketBoard,
        DEFAULT_DETECTIVE_TICKETS,
    };

    const RED: Piece = Piece::Detective(Detective::Red);
    const BLUE: Piece = Piece::Detective(Detective::Blue);

    fn detective(piece: Piece, location: u16) -> Player {
        Player::new(piece, DEFAULT_DETECTIVE_TICKETS, location)
    }

    fn start_with(setup: GameSetup, mr_x: Player, detectives: Vec<Player>) -> Position {
        Position::start(Arc::new(setup), mr_x, detectives).unwrap()
    }

    fn opening() -> Position {
        start_with(
            demo_setup(),
            Player::new(Piece::MrX, default_mr_x_tickets(2), 13),
            vec![detective(RED, 1), detective(BLUE, 20)],
        )
    }

    fn taxi(piece: Piece, source: u16, destination: u16) -> Move {
        Move::Single {
            piece,
            source,
            ticket: Ticket::Taxi,
            destination,
        }
    }

    #[test]
    fn evader_move_hands_turn_to_detectives() {
        let pos = opening();
        let next = pos.advance(&taxi(Piece::MrX, 13, 14)).unwrap();
        assert_eq!(next.mr_x().location, 14);
        assert_eq!(next.mr_x().tickets.count(Ticket::Taxi), 3);
        assert_eq!(next.remaining(), [RED, BLUE].into_iter().collect());
        assert_eq!(next.log(), &[LogEntry::Hidden { ticket: Ticket::Taxi }]);
        assert!(next.legal_moves().iter().all(|m| !m.commenced_by().is_mr_x()));
    }

    #[test]
    fn advance_leaves_receiver_untouched() {
        let pos = opening();
        let before = pos.key();
        let _ = pos.advance(&taxi(Piece::MrX, 13, 14)).unwrap();
        assert_eq!(pos.key(), before);
        assert!(pos.log().is_empty());
    }

    #[test]
    fn reveal_schedule_controls_log() {
        let setup = GameSetup::new(demo_graph(), vec![true, false, false]);
        let pos = start_with(
            setup,
            Player::new(Piece::MrX, default_mr_x_tickets(1), 13),
            vec![detective(RED, 1)],
        );
        let next = pos.advance(&taxi(Piece::MrX, 13, 14)).unwrap();
        assert_eq!(
            next.log(),
            &[LogEntry::Revealed {
                ticket: Ticket::Taxi,
                location: 14
            }]
        );
    }

    #[test]
    fn double_move_logs_both_legs() {
        let setup = GameSetup::new(demo_graph(), vec![false, true, false, false]);
        let pos = start_with(
            setup,
            Player::new(Piece::MrX, default_mr_x_tickets(1), 13),
            vec![detective(RED, 1)],
        );
        let double = Move::Double {
            piece: Piece::MrX,
            source: 13,
            ticket1: Ticket::Taxi,
            destination1: 14,
            ticket2: Ticket::Bus,
            destination2: 13,
        };
        // 14 has no bus line back to 13, so this is not legal.
        assert!(matches!(
            pos.advance(&double),
            Err(PositionError::IllegalMove(_))
        ));

        let double = Move::Double {
            piece: Piece::MrX,
            source: 13,
            ticket1: Ticket::Taxi,
            destination1: 14,
            ticket2: Ticket::Taxi,
            destination2: 15,
        };
        let next = pos.advance(&double).unwrap();
        assert_eq!(next.mr_x().location, 15);
        assert_eq!(next.mr_x().tickets.count(Ticket::Double), 1);
        assert_eq!(next.mr_x().tickets.count(Ticket::Taxi), 2);
        assert_eq!(
            next.log(),
            &[
                LogEntry::Hidden { ticket: Ticket::Taxi },
                LogEntry::Revealed {
                    ticket: Ticket::Taxi,
                    location: 15
                },
            ]
        );
        assert_eq!(next.remaining(), [RED].into_iter().collect());
    }

    #[test]
    fn detective_ticket_goes_to_evader() {
        let pos = opening().advance(&taxi(Piece::MrX, 13, 14)).unwrap();
        let next = pos.advance(&taxi(RED, 1, 2)).unwrap();
        assert_eq!(next.detective(RED).map(|d| d.location), Some(2));
        assert_eq!(
            next.detective(RED).map(|d| d.tickets.count(Ticket::Taxi)),
            Some(DEFAULT_DETECTIVE_TICKETS.count(Ticket::Taxi) - 1)
        );
        assert_eq!(next.mr_x().tickets.count(Ticket::Taxi), 4);
        assert_eq!(next.remaining(), [BLUE].into_iter().collect());
    }

    #[test]
    fn round_ends_after_last_detective() {
        let pos = opening()
            .advance(&taxi(Piece::MrX, 13, 14))
            .unwrap()
            .advance(&taxi(RED, 1, 2))
            .unwrap()
            .advance(&taxi(BLUE, 20, 19))
            .unwrap();
        assert_eq!(pos.remaining(), PieceSet::mr_x());
        assert!(pos.legal_moves().iter().all(|m| m.commenced_by().is_mr_x()));
    }

    #[test]
    fn stuck_detective_forfeits() {
        // BLUE holds no tickets, so once RED moves the round ends.
        let pos = start_with(
            demo_setup(),
            Player::new(Piece::MrX, default_mr_x_tickets(2), 13),
            vec![detective(RED, 1), Player::new(BLUE, TicketBoard::default(), 20)],
        );
        let after_x = pos.advance(&taxi(Piece::MrX, 13, 14)).unwrap();
        assert!(after_x.legal_moves().iter().all(|m| m.commenced_by() == RED));
        let after_red = after_x.advance(&taxi(RED, 1, 2)).unwrap();
        assert_eq!(after_red.remaining(), PieceSet::mr_x());
        assert!(!after_red.is_game_over());
    }

    #[test]
    fn illegal_move_is_rejected() {
        let pos = opening();
        let teleport = taxi(Piece::MrX, 13, 4);
        assert_eq!(
            pos.advance(&teleport).unwrap_err(),
            PositionError::IllegalMove(teleport)
        );
        let out_of_turn = taxi(RED, 1, 2);
        assert!(pos.advance(&out_of_turn).is_err());
    }

    #[test]
    fn capture_ends_the_game() {
        let pos = start_with(
            demo_setup(),
            Player::new(Piece::MrX, default_mr_x_tickets(1), 13),
            vec![detective(RED, 1)],
        );
        let bus = |piece, source, destination| Move::Single {
            piece,
            source,
            ticket: Ticket::Bus,
            destination,
        };
        let pos = pos.advance(&bus(Piece::MrX, 13, 3)).unwrap();
        let caught = pos.advance(&bus(RED, 1, 3)).unwrap();
        assert_eq!(caught.winner(), [RED].into_iter().collect());
        assert!(caught.legal_moves().is_empty());
        assert!(caught.advance(&taxi(Piece::MrX, 3, 4)).is_err());
    }
}
