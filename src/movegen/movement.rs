//! Move generation for single and double moves.
//!
//! For every piece owed a move, enumerates each unoccupied neighbour, each
//! transport mode on that edge, and each way of paying for it: the mode's own
//! ticket or, for the evader, a secret ticket. Double moves repeat this for a
//! second hop. Results are collected into an ordered set so equal moves reached
//! through different edge labels collapse to one entry and nothing else does.

use std::collections::BTreeSet;

use crate::board::graph::{Graph, Location};
use crate::board::moves::Move;
use crate::board::piece::{Piece, PieceSet, Player};
use crate::board::setup::GameSetup;
use crate::board::ticket::{Ticket, Transport};

/// Returns true if any detective stands on `location`.
#[inline]
pub fn occupied(detectives: &[Player], location: Location) -> bool {
    detectives.iter().any(|d| d.location == location)
}

/// Tickets that could pay for one hop by `transport`: the mode's own ticket,
/// plus a secret ticket when the mover is the evader.
fn payment_options(piece: Piece, transport: Transport) -> impl Iterator<Item = Ticket> {
    let required = transport.required_ticket();
    let secret = (piece.is_mr_x() && required != Ticket::Secret).then_some(Ticket::Secret);
    std::iter::once(required).chain(secret)
}

/// Legal moves for every piece in `remaining`, sorted and de-duplicated.
pub fn legal_moves(
    setup: &GameSetup,
    mr_x: &Player,
    detectives: &[Player],
    remaining: PieceSet,
    moves_made: usize,
) -> Vec<Move> {
    let mut moves = BTreeSet::new();
    for piece in remaining.iter() {
        let player = if piece.is_mr_x() {
            Some(mr_x)
        } else {
            detectives.iter().find(|d| d.piece == piece)
        };
        if let Some(player) = player {
            collect_moves(setup, player, detectives, moves_made, &mut moves);
        }
    }
    moves.into_iter().collect()
}

/// Adds every single and double move available to `player`.
fn collect_moves(
    setup: &GameSetup,
    player: &Player,
    detectives: &[Player],
    moves_made: usize,
    out: &mut BTreeSet<Move>,
) {
    let graph = &setup.graph;
    let piece = player.piece;
    let source = player.location;
    let can_double = piece.is_mr_x()
        && player.has(Ticket::Double)
        && setup.max_moves().saturating_sub(moves_made) >= 2;

    for first in graph.neighbours(source) {
        let destination1 = first.to;
        if occupied(detectives, destination1) {
            continue;
        }
        for &t1 in &first.transports {
            for ticket in payment_options(piece, t1) {
                if player.has(ticket) {
                    out.insert(Move::Single {
                        piece,
                        source,
                        ticket,
                        destination: destination1,
                    });
                }
            }

            if can_double {
                collect_second_legs(graph, player, detectives, destination1, t1, out);
            }
        }
    }
}

/// Adds the double moves whose first hop is `source -> destination1` by `t1`.
fn collect_second_legs(
    graph: &Graph,
    player: &Player,
    detectives: &[Player],
    destination1: Location,
    t1: Transport,
    out: &mut BTreeSet<Move>,
) {
    let piece = player.piece;
    for second in graph.neighbours(destination1) {
        let destination2 = second.to;
        if occupied(detectives, destination2) {
            continue;
        }
        for &t2 in &second.transports {
            for ticket1 in payment_options(piece, t1) {
                for ticket2 in payment_options(piece, t2) {
                    if player.tickets.can_afford_pair(ticket1, ticket2) {
                        out.insert(Move::Double {
                            piece,
                            source: player.location,
                            ticket1,
                            destination1,
                            ticket2,
                            destination2,
                        });
                    }
                }
            }
        }
    }
}

/// Returns true if `player` has at least one single move available.
///
/// Double moves never need checking: a legal double move always starts
/// with a legal single hop.
pub fn has_single_move(graph: &Graph, player: &Player, detectives: &[Player]) -> bool {
    graph.neighbours(player.location).iter().any(|adj| {
        !occupied(detectives, adj.to)
            && adj
                .transports
                .iter()
                .any(|&t| payment_options(player.piece, t).any(|ticket| player.has(ticket)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::demo::demo_setup;
    use crate::board::piece::Detective;
    use crate::board::ticket::TicketBoard;

    const RED: Piece = Piece::Detective(Detective::Red);

    fn line_setup() -> GameSetup {
        // 1 -taxi- 2 -taxi- 3, plus 2 -bus- 3
        let graph = Graph::from_edges(
            [1, 2, 3],
            [
                (1, 2, Transport::Taxi),
                (2, 3, Transport::Taxi),
                (2, 3, Transport::Bus),
            ],
        );
        GameSetup::new(graph, vec![false; 5])
    }

    fn mr_x(tickets: TicketBoard, location: Location) -> Player {
        Player::new(Piece::MrX, tickets, location)
    }

    #[test]
    fn single_moves_need_matching_ticket() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(0, 1, 0, 0, 0), 2);
        let moves = legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0);
        assert_eq!(
            moves,
            vec![Move::Single {
                piece: Piece::MrX,
                source: 2,
                ticket: Ticket::Bus,
                destination: 3
            }]
        );
    }

    #[test]
    fn secret_ticket_substitutes_any_mode() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(0, 0, 0, 0, 1), 2);
        let moves = legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0);
        // One secret move per destination, not one per edge label.
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| m.tickets() == vec![Ticket::Secret]));
    }

    #[test]
    fn detectives_block_destinations() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(5, 5, 0, 0, 0), 2);
        let red = Player::new(RED, TicketBoard::new(5, 0, 0, 0, 0), 3);
        let moves = legal_moves(&setup, &x, &[red], PieceSet::mr_x(), 0);
        assert!(moves.iter().all(|m| m.final_destination() == 1));
    }

    #[test]
    fn detectives_never_use_secret() {
        let setup = demo_setup();
        let x = mr_x(TicketBoard::default(), 1);
        // Detective next to the ferry with no ferry-capable tickets.
        let red = Player::new(RED, TicketBoard::new(0, 0, 0, 0, 0), 16);
        let moves = legal_moves(&setup, &x, &[red], [RED].into_iter().collect(), 0);
        assert!(moves.is_empty());
    }

    #[test]
    fn ferry_needs_secret() {
        let setup = demo_setup();
        let no_secret = mr_x(TicketBoard::new(9, 9, 9, 0, 0), 16);
        let moves = legal_moves(&setup, &no_secret, &[], PieceSet::mr_x(), 0);
        assert!(moves.iter().all(|m| m.final_destination() != 10));

        let with_secret = mr_x(TicketBoard::new(0, 0, 0, 0, 1), 16);
        let moves = legal_moves(&setup, &with_secret, &[], PieceSet::mr_x(), 0);
        assert!(moves.iter().any(|m| m.final_destination() == 10));
    }

    #[test]
    fn double_same_mode_needs_two_tickets() {
        let setup = line_setup();
        let one_taxi = mr_x(TicketBoard::new(1, 0, 0, 1, 0), 1);
        let moves = legal_moves(&setup, &one_taxi, &[], PieceSet::mr_x(), 0);
        assert!(!moves.iter().any(|m| m.is_double()));

        let two_taxi = mr_x(TicketBoard::new(2, 0, 0, 1, 0), 1);
        let moves = legal_moves(&setup, &two_taxi, &[], PieceSet::mr_x(), 0);
        assert!(moves.contains(&Move::Double {
            piece: Piece::MrX,
            source: 1,
            ticket1: Ticket::Taxi,
            destination1: 2,
            ticket2: Ticket::Taxi,
            destination2: 3,
        }));
    }

    #[test]
    fn double_mixed_modes_need_one_each() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(1, 1, 0, 1, 0), 1);
        let moves = legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0);
        let doubles: Vec<_> = moves.iter().filter(|m| m.is_double()).collect();
        // 1->2 taxi then 2->3 bus, and 1->2 taxi then back 2->1 needs two taxis.
        assert_eq!(doubles.len(), 1);
        assert_eq!(doubles[0].tickets(), vec![Ticket::Double, Ticket::Taxi, Ticket::Bus]);
    }

    #[test]
    fn double_legs_may_substitute_secret() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(1, 0, 0, 1, 1), 1);
        let moves = legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0);
        let has = |t1, d2, t2| {
            moves.contains(&Move::Double {
                piece: Piece::MrX,
                source: 1,
                ticket1: t1,
                destination1: 2,
                ticket2: t2,
                destination2: d2,
            })
        };
        assert!(has(Ticket::Taxi, 3, Ticket::Secret));
        assert!(has(Ticket::Secret, 3, Ticket::Taxi));
        assert!(has(Ticket::Secret, 1, Ticket::Taxi));
        assert!(!has(Ticket::Secret, 3, Ticket::Secret));
    }

    #[test]
    fn double_needs_two_moves_left() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(4, 4, 0, 1, 0), 1);
        assert!(legal_moves(&setup, &x, &[], PieceSet::mr_x(), 3)
            .iter()
            .any(|m| m.is_double()));
        assert!(!legal_moves(&setup, &x, &[], PieceSet::mr_x(), 4)
            .iter()
            .any(|m| m.is_double()));
    }

    #[test]
    fn double_may_return_to_source() {
        let setup = line_setup();
        let x = mr_x(TicketBoard::new(2, 0, 0, 1, 0), 1);
        let moves = legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0);
        assert!(moves
            .iter()
            .any(|m| m.is_double() && m.final_destination() == 1));
    }

    #[test]
    fn has_single_move_matches_generation() {
        let setup = demo_setup();
        for loc in setup.graph.nodes() {
            for tickets in [TicketBoard::new(1, 0, 0, 0, 0), TicketBoard::new(0, 0, 1, 0, 0)] {
                let x = mr_x(tickets, loc);
                let generated = !legal_moves(&setup, &x, &[], PieceSet::mr_x(), 0).is_empty();
                assert_eq!(has_single_move(&setup.graph, &x, &[]), generated, "at {}", loc);
            }
        }
    }
}
