//! Shortest-path distance oracle.
//!
//! Every edge costs one move, so distances are plain BFS hop counts over the
//! undirected transport graph. `DistanceTable` fills one BFS row per source on
//! first use and is safe to share between threads and between searches on the
//! same graph.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use crate::board::{GameSetup, Graph, Location};

use super::cache::DistanceCache;

/// Hop count reported for a location that cannot be reached.
pub const UNREACHABLE: u32 = u32::MAX;

/// Single-source hop counts, indexed by location.
///
/// Slots for locations that are not in the graph, and for nodes in another
/// component, hold `UNREACHABLE`. A source outside the graph reaches nothing.
pub fn distances_from(graph: &Graph, source: Location) -> Vec<u32> {
    let mut dist = vec![UNREACHABLE; graph.slot_count()];
    if !graph.contains(source) {
        return dist;
    }

    let mut queue = VecDeque::with_capacity(graph.node_count());
    dist[source as usize] = 0;
    queue.push_back(source);

    while let Some(cur) = queue.pop_front() {
        let d = dist[cur as usize] + 1;
        for next in graph.adjacent_nodes(cur) {
            let slot = &mut dist[next as usize];
            if *slot == UNREACHABLE {
                *slot = d;
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Lazily filled all-pairs distance table for one graph.
pub struct DistanceTable {
    setup: Arc<GameSetup>,
    rows: Vec<OnceLock<Vec<u32>>>,
    cache: Option<Arc<dyn DistanceCache>>,
}

impl DistanceTable {
    /// Creates an empty table over the setup's graph.
    pub fn new(setup: Arc<GameSetup>) -> Self {
        let slots = setup.graph.slot_count();
        DistanceTable {
            rows: (0..slots).map(|_| OnceLock::new()).collect(),
            setup,
            cache: None,
        }
    }

    /// Creates a table that consults `cache` before running BFS.
    pub fn with_cache(setup: Arc<GameSetup>, cache: Arc<dyn DistanceCache>) -> Self {
        DistanceTable {
            cache: Some(cache),
            ..Self::new(setup)
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.setup.graph
    }

    /// Hop count between two locations, `UNREACHABLE` if there is no path.
    pub fn distance(&self, from: Location, to: Location) -> u32 {
        if from == to && self.graph().contains(from) {
            return 0;
        }
        match self.row(from) {
            Some(row) => row.get(to as usize).copied().unwrap_or(UNREACHABLE),
            None => UNREACHABLE,
        }
    }

    /// The full BFS row for `source`, computed on first request.
    pub fn row(&self, source: Location) -> Option<&[u32]> {
        let cell = self.rows.get(source as usize)?;
        Some(cell.get_or_init(|| self.fill_row(source)).as_slice())
    }

    /// Number of rows computed so far.
    pub fn rows_filled(&self) -> usize {
        self.rows.iter().filter(|r| r.get().is_some()).count()
    }

    fn fill_row(&self, source: Location) -> Vec<u32> {
        if let Some(row) = self.cached_row(source) {
            return row;
        }
        let row = distances_from(self.graph(), source);
        if let Some(cache) = &self.cache {
            for to in self.graph().nodes() {
                let d = row[to as usize];
                if d == UNREACHABLE {
                    continue;
                }
                if let Err(e) = cache.put(source, to, d) {
                    log::warn!("distance cache write failed for ({source}, {to}): {e}");
                    break;
                }
            }
        }
        row
    }

    /// Rebuilds a row entirely from the cache. Any miss or failure means the
    /// row is recomputed instead; a partial row is never trusted.
    fn cached_row(&self, source: Location) -> Option<Vec<u32>> {
        let cache = self.cache.as_ref()?;
        if !self.graph().contains(source) {
            return None;
        }
        let mut row = vec![UNREACHABLE; self.graph().slot_count()];
        for to in self.graph().nodes() {
            match cache.get(source, to) {
                Ok(Some(d)) => row[to as usize] = d,
                Ok(None) => return None,
                Err(e) => {
                    log::warn!("distance cache read failed for ({source}, {to}): {e}");
                    return None;
                }
            }
        }
        Some(row)
    }
}

impl std::fmt::Debug for DistanceTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceTable")
            .field("slots", &self.rows.len())
            .field("rows_filled", &self.rows_filled())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{demo_graph, demo_setup, Transport};
    use crate::eval::cache::{CacheError, MemoryDistanceCache};

    /// A backend that is always down.
    struct UnavailableCache;

    impl DistanceCache for UnavailableCache {
        fn get(&self, _: Location, _: Location) -> Result<Option<u32>, CacheError> {
            Err(CacheError::Unavailable("offline".to_string()))
        }

        fn put(&self, _: Location, _: Location, _: u32) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("offline".to_string()))
        }
    }

    /// Reads succeed but writes fail.
    struct ReadOnlyCache(MemoryDistanceCache);

    impl DistanceCache for ReadOnlyCache {
        fn get(&self, from: Location, to: Location) -> Result<Option<u32>, CacheError> {
            self.0.get(from, to)
        }

        fn put(&self, _: Location, _: Location, _: u32) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("read only".to_string()))
        }
    }

    fn assert_matches_bfs(table: &DistanceTable) {
        let g = table.graph().clone();
        for a in g.nodes() {
            let row = distances_from(&g, a);
            for b in g.nodes() {
                assert_eq!(table.distance(a, b), row[b as usize], "{a}->{b}");
            }
        }
    }

    #[test]
    fn self_distance_is_zero() {
        let g = demo_graph();
        for n in g.nodes() {
            assert_eq!(distances_from(&g, n)[n as usize], 0);
        }
    }

    #[test]
    fn known_distances_on_demo_map() {
        let g = demo_graph();
        let d = distances_from(&g, 13);
        assert_eq!(d[14], 1);
        assert_eq!(d[1], 1); // underground
        assert_eq!(d[20], 1); // underground
        assert_eq!(d[5], 2); // bus via 3 or 15
        assert_eq!(d[21], 3);
    }

    #[test]
    fn ferry_counts_as_an_edge() {
        let g = demo_graph();
        assert_eq!(distances_from(&g, 10)[16], 1);
    }

    #[test]
    fn disconnected_nodes_are_unreachable() {
        let g = Graph::from_edges([1, 2, 3], [(1, 2, Transport::Taxi)]);
        let d = distances_from(&g, 1);
        assert_eq!(d[2], 1);
        assert_eq!(d[3], UNREACHABLE);
        // Slot 0 is not a node.
        assert_eq!(d[0], UNREACHABLE);
    }

    #[test]
    fn unknown_source_reaches_nothing() {
        let g = demo_graph();
        let d = distances_from(&g, 0);
        assert!(d.iter().all(|&x| x == UNREACHABLE));
    }

    #[test]
    fn symmetric_and_triangular() {
        let g = demo_graph();
        let rows: Vec<Vec<u32>> = (0..g.slot_count() as Location)
            .map(|s| distances_from(&g, s))
            .collect();
        for a in g.nodes() {
            for b in g.nodes() {
                let ab = rows[a as usize][b as usize];
                assert_eq!(ab, rows[b as usize][a as usize]);
                for c in g.nodes() {
                    let via = rows[a as usize][c as usize] + rows[c as usize][b as usize];
                    assert!(ab <= via, "{a}->{b} via {c}");
                }
            }
        }
    }

    #[test]
    fn table_fills_rows_lazily() {
        let table = DistanceTable::new(Arc::new(demo_setup()));
        assert_eq!(table.rows_filled(), 0);
        assert_eq!(table.distance(13, 21), 3);
        assert_eq!(table.rows_filled(), 1);
        assert_eq!(table.distance(13, 13), 0);
        assert_eq!(table.distance(13, 500), UNREACHABLE);
        assert_eq!(table.distance(500, 13), UNREACHABLE);
    }

    #[test]
    fn table_backfills_and_reads_cache() {
        let setup = Arc::new(demo_setup());
        let cache = Arc::new(MemoryDistanceCache::new());
        let table = DistanceTable::with_cache(Arc::clone(&setup), cache.clone());
        assert_eq!(table.distance(13, 21), 3);
        assert_eq!(cache.get(13, 21).unwrap(), Some(3));
        assert_eq!(cache.len(), setup.graph.node_count());

        // A second table over the same cache agrees without recomputing.
        let again = DistanceTable::with_cache(setup, cache);
        assert_eq!(again.distance(13, 21), 3);
    }

    #[test]
    fn unavailable_cache_falls_back_to_bfs() {
        let table = DistanceTable::with_cache(Arc::new(demo_setup()), Arc::new(UnavailableCache));
        assert_matches_bfs(&table);
    }

    #[test]
    fn failed_backfill_still_answers() {
        let cache = Arc::new(ReadOnlyCache(MemoryDistanceCache::new()));
        let table = DistanceTable::with_cache(Arc::new(demo_setup()), cache.clone());
        assert_matches_bfs(&table);
        assert!(cache.0.is_empty());
    }

    #[test]
    fn partial_row_is_recomputed() {
        let setup = Arc::new(demo_setup());
        let cache = Arc::new(MemoryDistanceCache::new());
        // Half a row of wrong values: trusting any of it would show.
        for to in setup.graph.nodes().take(10) {
            cache.put(13, to, 99).unwrap();
        }

        let table = DistanceTable::with_cache(Arc::clone(&setup), cache.clone());
        assert_matches_bfs(&table);
        // The recomputed row was written back over the stale entries.
        assert_eq!(cache.get(13, 1).unwrap(), Some(1));
    }
}
