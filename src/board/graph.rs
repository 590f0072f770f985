//! Transport graph.
//!
//! An undirected multigraph over numbered locations. Each neighbour entry
//! records every transport mode connecting the two locations, so a pair
//! joined by both taxi and bus appears once with two modes. Entries are kept
//! sorted by destination so iteration order is deterministic.

use super::ticket::Transport;

/// A node on the map.
pub type Location = u16;

/// One neighbour of a location and the modes connecting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    pub to: Location,
    pub transports: Vec<Transport>,
}

/// Undirected transport graph indexed by `Location as usize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<Adjacency>>,
    present: Vec<bool>,
    node_count: usize,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from an explicit node list and edge list.
    pub fn from_edges<N, E>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = Location>,
        E: IntoIterator<Item = (Location, Location, Transport)>,
    {
        let mut graph = Graph::new();
        for n in nodes {
            graph.add_node(n);
        }
        for (a, b, t) in edges {
            graph.add_edge(a, b, t);
        }
        graph
    }

    fn ensure_slot(&mut self, location: Location) {
        let idx = location as usize;
        if idx >= self.present.len() {
            self.present.resize(idx + 1, false);
            self.adjacency.resize_with(idx + 1, Vec::new);
        }
    }

    /// Adds a node. Returns false if it already existed.
    pub fn add_node(&mut self, location: Location) -> bool {
        self.ensure_slot(location);
        let idx = location as usize;
        if self.present[idx] {
            return false;
        }
        self.present[idx] = true;
        self.node_count += 1;
        true
    }

    /// Adds an undirected edge labelled with one transport mode, creating
    /// either endpoint if needed. Self-loops are ignored.
    pub fn add_edge(&mut self, a: Location, b: Location, transport: Transport) {
        if a == b {
            return;
        }
        self.add_node(a);
        self.add_node(b);
        self.insert_directed(a, b, transport);
        self.insert_directed(b, a, transport);
    }

    fn insert_directed(&mut self, from: Location, to: Location, transport: Transport) {
        let list = &mut self.adjacency[from as usize];
        match list.binary_search_by_key(&to, |adj| adj.to) {
            Ok(i) => {
                let modes = &mut list[i].transports;
                if let Err(pos) = modes.binary_search(&transport) {
                    modes.insert(pos, transport);
                }
            }
            Err(i) => list.insert(
                i,
                Adjacency {
                    to,
                    transports: vec![transport],
                },
            ),
        }
    }

    /// Returns true if the location is a node of this graph.
    #[inline]
    pub fn contains(&self, location: Location) -> bool {
        self.present
            .get(location as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// True if the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// One past the highest location id; the length of any per-location table.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.present.len()
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = Location> + '_ {
        self.present
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(i, _)| i as Location)
    }

    /// Neighbour entries of a location, ascending by destination.
    #[inline]
    pub fn neighbours(&self, location: Location) -> &[Adjacency] {
        self.adjacency
            .get(location as usize)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Distinct adjacent locations, ascending.
    pub fn adjacent_nodes(&self, location: Location) -> impl Iterator<Item = Location> + '_ {
        self.neighbours(location).iter().map(|adj| adj.to)
    }

    /// Transport modes joining two locations (empty if not adjacent).
    pub fn transports_between(&self, a: Location, b: Location) -> &[Transport] {
        let list = self.neighbours(a);
        match list.binary_search_by_key(&b, |adj| adj.to) {
            Ok(i) => &list[i].transports,
            Err(_) => &[],
        }
    }

    /// All undirected edges, each reported once with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (Location, Location, Transport)> + '_ {
        self.nodes().flat_map(move |a| {
            self.neighbours(a)
                .iter()
                .filter(move |adj| adj.to > a)
                .flat_map(move |adj| adj.transports.iter().map(move |&t| (a, adj.to, t)))
        })
    }
}
