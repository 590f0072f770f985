//! Position evaluation.
//!
//! Hop distances over the transport graph (with an optional persistent
//! cache) and the heuristic that turns them into a score for the evader.

pub mod cache;
pub mod distance;
pub mod heuristic;

pub use cache::{
    precompute_all_pairs, CacheError, DistanceCache, GraphFingerprint, JsonFileDistanceCache,
    MemoryDistanceCache,
};
pub use distance::{distances_from, DistanceTable, UNREACHABLE};
pub use heuristic::{distance_score, evaluate, walks_into_capture};
