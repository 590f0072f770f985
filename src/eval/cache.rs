//! Optional read-through store for precomputed hop distances.
//!
//! The distance table works without any cache. When one is attached it is
//! consulted before BFS and backfilled afterwards; every failure degrades to
//! recomputation. A persistent cache remembers the map its entries belong to
//! and serves nothing for any other map.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::board::{Graph, Location, Transport};

use super::distance::{distances_from, UNREACHABLE};

/// Errors from a distance cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cache file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store of hop counts keyed by an ordered pair of locations.
pub trait DistanceCache: Send + Sync {
    /// The cached hop count from `from` to `to`, if present.
    fn get(&self, from: Location, to: Location) -> Result<Option<u32>, CacheError>;

    /// Records a hop count.
    fn put(&self, from: Location, to: Location, distance: u32) -> Result<(), CacheError>;
}

/// In-process cache backed by a locked hash map.
#[derive(Debug, Default)]
pub struct MemoryDistanceCache {
    entries: RwLock<HashMap<(Location, Location), u32>>,
}

impl MemoryDistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::Unavailable("lock poisoned".to_string())
}

impl DistanceCache for MemoryDistanceCache {
    fn get(&self, from: Location, to: Location) -> Result<Option<u32>, CacheError> {
        let map = self.entries.read().map_err(poisoned)?;
        Ok(map.get(&(from, to)).copied())
    }

    fn put(&self, from: Location, to: Location, distance: u32) -> Result<(), CacheError> {
        let mut map = self.entries.write().map_err(poisoned)?;
        map.insert((from, to), distance);
        Ok(())
    }
}

/// Content identity of a map: its node list and sorted edge list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFingerprint {
    nodes: Vec<Location>,
    edges: Vec<(Location, Location, Transport)>,
}

impl GraphFingerprint {
    pub fn of(graph: &Graph) -> Self {
        let mut edges: Vec<_> = graph.edges().collect();
        edges.sort_unstable();
        GraphFingerprint {
            nodes: graph.nodes().collect(),
            edges,
        }
    }
}

/// On-disk layout of a distance cache file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    /// Map the entries were computed on. Files without one are never trusted.
    #[serde(default)]
    graph: Option<GraphFingerprint>,
    /// `[from, to, hops]` triples.
    entries: Vec<(Location, Location, u32)>,
}

/// Persistent cache stored as a JSON file.
///
/// The file is read once on `open` and rewritten by `flush`. Entries are
/// served only after `bind` has confirmed they belong to the graph being
/// searched; binding to a different graph empties the cache.
#[derive(Debug)]
pub struct JsonFileDistanceCache {
    path: PathBuf,
    graph: RwLock<Option<GraphFingerprint>>,
    memory: MemoryDistanceCache,
}

impl JsonFileDistanceCache {
    /// Opens the cache at `path`. A missing file yields an empty, unbound
    /// cache.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let memory = MemoryDistanceCache::new();
        let mut graph = None;
        match fs::read_to_string(&path) {
            Ok(text) => {
                let file: CacheFile = serde_json::from_str(&text)?;
                for (from, to, d) in file.entries {
                    memory.put(from, to, d)?;
                }
                graph = file.graph;
                log::debug!("loaded {} cached distances from {}", memory.len(), path.display());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(JsonFileDistanceCache {
            path,
            graph: RwLock::new(graph),
            memory,
        })
    }

    /// Opens the cache at `path` and binds it to `graph`.
    pub fn open_for(path: impl AsRef<Path>, graph: &Graph) -> Result<Self, CacheError> {
        let cache = Self::open(path)?;
        cache.bind(graph)?;
        Ok(cache)
    }

    /// Ties the cache to `graph`. Entries recorded for another map, or for
    /// no known map, are discarded. Returns true if the existing entries
    /// were kept.
    pub fn bind(&self, graph: &Graph) -> Result<bool, CacheError> {
        let fingerprint = GraphFingerprint::of(graph);
        let mut bound = self.graph.write().map_err(poisoned)?;
        if bound.as_ref() == Some(&fingerprint) {
            return Ok(true);
        }
        if !self.memory.is_empty() {
            log::warn!(
                "distance cache {} belongs to another map; starting empty",
                self.path.display()
            );
        }
        self.memory.clear()?;
        *bound = Some(fingerprint);
        Ok(false)
    }

    fn is_bound(&self) -> Result<bool, CacheError> {
        Ok(self.graph.read().map_err(poisoned)?.is_some())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Writes every entry back to the file.
    pub fn flush(&self) -> Result<(), CacheError> {
        let mut entries: Vec<(Location, Location, u32)> = {
            let map = self.memory.entries.read().map_err(poisoned)?;
            map.iter().map(|(&(a, b), &d)| (a, b, d)).collect()
        };
        entries.sort_unstable();
        let graph = self.graph.read().map_err(poisoned)?.clone();
        let text = serde_json::to_string(&CacheFile { graph, entries })?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl DistanceCache for JsonFileDistanceCache {
    fn get(&self, from: Location, to: Location) -> Result<Option<u32>, CacheError> {
        if !self.is_bound()? {
            return Ok(None);
        }
        self.memory.get(from, to)
    }

    fn put(&self, from: Location, to: Location, distance: u32) -> Result<(), CacheError> {
        if !self.is_bound()? {
            return Err(CacheError::Unavailable("cache is not bound to a map".to_string()));
        }
        self.memory.put(from, to, distance)
    }
}

/// Fills `cache` with every reachable ordered pair of the graph.
/// Returns the number of entries written.
pub fn precompute_all_pairs(graph: &Graph, cache: &dyn DistanceCache) -> Result<usize, CacheError> {
    let mut written = 0;
    for from in graph.nodes() {
        let row = distances_from(graph, from);
        for to in graph.nodes() {
            let d = row[to as usize];
            if d != UNREACHABLE {
                cache.put(from, to, d)?;
                written += 1;
            }
        }
    }
    Ok(written)
}
