//! JSON board documents.
//!
//! The `position` command carries a single-line JSON document describing an
//! observed board. Missing parts fall back to the built-in demo map and the
//! classic reveal schedule:
//!
//! ```json
//! {"mrx": {"tickets": {"taxi": 4, "bus": 3, "underground": 3, "double": 2, "secret": 2},
//!          "location": 13},
//!  "detectives": [{"piece": "red", "tickets": {"taxi": 11, "bus": 8, "underground": 4},
//!                  "location": 1}],
//!  "log": [{"kind": "hidden", "ticket": "taxi"}],
//!  "to_move": ["mrx"]}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::state::stand_in_location;
use crate::board::{
    classic_reveals, demo_graph, BoardSnapshot, GameSetup, Graph, Location, LogEntry, Piece,
    PieceSet, Player, Position, PositionError, TicketBoard, Transport, ALL_TICKETS,
};

/// Errors that can occur when reading a board document.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid setup: {0}")]
    Setup(String),

    #[error(transparent)]
    Position(#[from] PositionError),
}

/// Ticket counts by name; omitted kinds are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketsDoc {
    pub taxi: u8,
    pub bus: u8,
    pub underground: u8,
    pub double: u8,
    pub secret: u8,
}

impl From<TicketsDoc> for TicketBoard {
    fn from(t: TicketsDoc) -> Self {
        TicketBoard::new(t.taxi, t.bus, t.underground, t.double, t.secret)
    }
}

impl From<TicketBoard> for TicketsDoc {
    fn from(b: TicketBoard) -> Self {
        let [taxi, bus, underground, double, secret] = ALL_TICKETS.map(|t| b.count(t));
        TicketsDoc {
            taxi,
            bus,
            underground,
            double,
            secret,
        }
    }
}

/// A transport graph as nodes plus `[a, b, mode]` edges. Nodes named by an
/// edge need not be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDoc {
    #[serde(default)]
    pub nodes: Vec<Location>,
    pub edges: Vec<(Location, Location, Transport)>,
}

impl GraphDoc {
    pub fn to_graph(&self) -> Graph {
        Graph::from_edges(self.nodes.iter().copied(), self.edges.iter().copied())
    }

    pub fn from_graph(graph: &Graph) -> Self {
        GraphDoc {
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaderDoc {
    pub tickets: TicketsDoc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectiveDoc {
    pub piece: Piece,
    pub tickets: TicketsDoc,
    pub location: Location,
}

/// A complete board document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphDoc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveals: Option<Vec<bool>>,
    pub mrx: EvaderDoc,
    #[serde(default)]
    pub detectives: Vec<DetectiveDoc>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    /// Pieces owed a move; empty means the evader.
    #[serde(default)]
    pub to_move: Vec<Piece>,
}

impl SnapshotDoc {
    /// Describes `position` as `viewer` sees it. Detectives never see the
    /// evader's location. The graph and schedule are always written out.
    pub fn from_position(position: &Position, viewer: Piece) -> Self {
        SnapshotDoc {
            graph: Some(GraphDoc::from_graph(&position.setup().graph)),
            reveals: Some(position.setup().reveals.clone()),
            mrx: EvaderDoc {
                tickets: position.mr_x().tickets.into(),
                location: viewer.is_mr_x().then_some(position.mr_x().location),
            },
            detectives: position
                .detectives()
                .iter()
                .map(|d| DetectiveDoc {
                    piece: d.piece,
                    tickets: d.tickets.into(),
                    location: d.location,
                })
                .collect(),
            log: position.log().to_vec(),
            to_move: position.remaining().iter().collect(),
        }
    }

    /// Builds the observed board, computing legal moves and the winner.
    ///
    /// When the evader's location is hidden, moves and the winner are
    /// computed against a stand-in location; detective moves never depend on
    /// where the evader is.
    pub fn to_snapshot(&self) -> Result<BoardSnapshot, SnapshotError> {
        let graph = match &self.graph {
            Some(g) => g.to_graph(),
            None => demo_graph(),
        };
        let reveals = self.reveals.clone().unwrap_or_else(classic_reveals);
        let setup = Arc::new(GameSetup::new(graph, reveals));

        let remaining: PieceSet = self.to_move.iter().copied().collect();
        if remaining.contains(Piece::MrX) && remaining.len() > 1 {
            return Err(SnapshotError::Setup(
                "the evader and detectives cannot share a turn".to_string(),
            ));
        }
        let remaining = if remaining.is_empty() {
            PieceSet::mr_x()
        } else {
            remaining
        };

        let detectives: Vec<Player> = self
            .detectives
            .iter()
            .map(|d| Player::new(d.piece, d.tickets.into(), d.location))
            .collect();
        let location = self
            .mrx
            .location
            .unwrap_or_else(|| stand_in_location(&setup, &detectives, &self.log));
        let mr_x = Player::new(Piece::MrX, self.mrx.tickets.into(), location);

        let position = Position::new(setup, mr_x, detectives, remaining, self.log.clone())?;
        let mut snapshot = position.observe(Piece::MrX);
        snapshot.mr_x_location = self.mrx.location;
        Ok(snapshot)
    }
}

/// Parses a JSON board document into an observed board.
pub fn parse_snapshot(json: &str) -> Result<BoardSnapshot, SnapshotError> {
    let doc: SnapshotDoc = serde_json::from_str(json)?;
    doc.to_snapshot()
}

/// Encodes `position` as seen by `viewer` as single-line JSON.
pub fn encode_snapshot(position: &Position, viewer: Piece) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string(&SnapshotDoc::from_position(position, viewer))?)
}

/// Parses a JSON graph document, as used for map files.
pub fn parse_graph(json: &str) -> Result<Graph, SnapshotError> {
    let doc: GraphDoc = serde_json::from_str(json)?;
    let graph = doc.to_graph();
    if graph.is_empty() {
        return Err(SnapshotError::Setup("map has no locations".to_string()));
    }
    Ok(graph)
}
