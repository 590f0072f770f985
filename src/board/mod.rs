//! Board representation and game-state types.
//!
//! Contains the core data structures for the transport graph, tickets,
//! players, moves, the travel log, and the immutable game position.

pub mod demo;
pub mod graph;
pub mod moves;
pub mod piece;
pub mod setup;
pub mod snapshot;
pub mod state;
pub mod ticket;

pub use demo::{demo_graph, demo_setup, DEMO_EDGES, DEMO_EDGE_COUNT, DEMO_LOCATION_COUNT};
pub use graph::{Adjacency, Graph, Location};
pub use moves::{LogEntry, Move, Whereabouts};
pub use piece::{Detective, Piece, PieceSet, Player, ALL_DETECTIVES};
pub use setup::{
    classic_reveals, default_mr_x_tickets, GameSetup, CLASSIC_GAME_LENGTH, CLASSIC_REVEAL_MOVES,
    DEFAULT_DETECTIVE_TICKETS,
};
pub use snapshot::BoardSnapshot;
pub use state::{Position, PositionError, PositionKey};
pub use ticket::{Ticket, TicketBoard, Transport, ALL_TICKETS, TICKET_COUNT};
