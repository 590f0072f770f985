//! Built-in demonstration map.
//!
//! A 21-location board: a 4x5 taxi grid (locations 1-20, row-major), bus and
//! underground express lines through the centre, one ferry crossing, and a
//! dead-end location 21 hanging off location 5. Small enough for exhaustive
//! tests, rich enough to exercise every ticket rule.
//!
//! ```text
//!   1 --  2 --  3 --  4 --  5 -- 21
//!   |     |     |     |     |
//!   6 --  7 --  8 --  9 -- 10
//!   |     |     |     |     |
//!  11 -- 12 -- 13 -- 14 -- 15
//!   |     |     |     |     |
//!  16 -- 17 -- 18 -- 19 -- 20
//! ```

use super::graph::{Graph, Location};
use super::setup::{classic_reveals, GameSetup};
use super::ticket::Transport;

/// A single undirected demo-map edge.
#[derive(Debug, Clone, Copy)]
pub struct DemoEdge {
    pub a: Location,
    pub b: Location,
    pub transport: Transport,
}

const fn taxi(a: Location, b: Location) -> DemoEdge {
    DemoEdge {
        a,
        b,
        transport: Transport::Taxi,
    }
}
const fn bus(a: Location, b: Location) -> DemoEdge {
    DemoEdge {
        a,
        b,
        transport: Transport::Bus,
    }
}
const fn underground(a: Location, b: Location) -> DemoEdge {
    DemoEdge {
        a,
        b,
        transport: Transport::Underground,
    }
}
const fn ferry(a: Location, b: Location) -> DemoEdge {
    DemoEdge {
        a,
        b,
        transport: Transport::Ferry,
    }
}

/// Number of locations on the demo map.
pub const DEMO_LOCATION_COUNT: usize = 21;

/// Number of undirected edges in the demo map.
///
/// Breakdown:
/// - Taxi grid: 16 horizontal + 15 vertical + 1 dead-end spur = 32
/// - Bus: 7
/// - Underground: 3
/// - Ferry: 1
/// Total: 43
pub const DEMO_EDGE_COUNT: usize = 43;

/// Complete demo-map edge table.
pub static DEMO_EDGES: [DemoEdge; DEMO_EDGE_COUNT] = [
    // Taxi, horizontal
    taxi(1, 2),
    taxi(2, 3),
    taxi(3, 4),
    taxi(4, 5),
    taxi(6, 7),
    taxi(7, 8),
    taxi(8, 9),
    taxi(9, 10),
    taxi(11, 12),
    taxi(12, 13),
    taxi(13, 14),
    taxi(14, 15),
    taxi(16, 17),
    taxi(17, 18),
    taxi(18, 19),
    taxi(19, 20),
    // Taxi, vertical
    taxi(1, 6),
    taxi(2, 7),
    taxi(3, 8),
    taxi(4, 9),
    taxi(5, 10),
    taxi(6, 11),
    taxi(7, 12),
    taxi(8, 13),
    taxi(9, 14),
    taxi(10, 15),
    taxi(11, 16),
    taxi(12, 17),
    taxi(13, 18),
    taxi(14, 19),
    taxi(15, 20),
    // Dead end
    taxi(5, 21),
    // Bus
    bus(1, 3),
    bus(3, 5),
    bus(3, 13),
    bus(11, 13),
    bus(13, 15),
    bus(16, 18),
    bus(18, 20),
    // Underground
    underground(1, 13),
    underground(13, 20),
    underground(5, 16),
    // Ferry
    ferry(10, 16),
];

/// Builds the demo graph.
pub fn demo_graph() -> Graph {
    Graph::from_edges(
        1..=DEMO_LOCATION_COUNT as Location,
        DEMO_EDGES.iter().map(|e| (e.a, e.b, e.transport)),
    )
}

/// The demo graph with the classic 24-move reveal schedule.
pub fn demo_setup() -> GameSetup {
    GameSetup::new(demo_graph(), classic_reveals())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_graph_counts() {
        let g = demo_graph();
        assert_eq!(g.node_count(), DEMO_LOCATION_COUNT);
        assert_eq!(g.edges().count(), DEMO_EDGE_COUNT);
    }

    #[test]
    fn dead_end_has_one_neighbour() {
        let g = demo_graph();
        assert_eq!(g.adjacent_nodes(21).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn hub_has_mixed_modes() {
        let g = demo_graph();
        assert_eq!(g.transports_between(13, 3), &[Transport::Bus]);
        assert_eq!(g.transports_between(13, 1), &[Transport::Underground]);
        assert_eq!(g.transports_between(13, 18), &[Transport::Taxi]);
        assert_eq!(g.transports_between(16, 10), &[Transport::Ferry]);
    }
}
