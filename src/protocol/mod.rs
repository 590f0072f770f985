//! SYI protocol handling.
//!
//! This module implements parsing and serialization for the SYI text
//! protocol: compact move notation, JSON board documents, and the command
//! parser for the main loop.

pub mod notation;
pub mod parser;
pub mod snapshot;

pub use notation::{format_move, parse_move, parse_notation, MoveNotation, NotationError};
pub use parser::{parse_command, Command, GoParams};
pub use snapshot::{
    encode_snapshot, parse_graph, parse_snapshot, DetectiveDoc, EvaderDoc, GraphDoc, SnapshotDoc,
    SnapshotError, TicketsDoc,
};
