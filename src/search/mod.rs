//! Search and move selection.
//!
//! Negamax with alpha-beta pruning over immutable positions, a shared
//! transposition table for move ordering, and an iterative-deepening root
//! driver that evaluates candidate moves in parallel.

pub mod negamax;
pub mod picker;
pub mod tt;

pub use negamax::{search, SearchContext};
pub use picker::{format_score, pick_move, SearchConfig, SearchError, SearchResult};
pub use tt::{TranspositionTable, DEFAULT_TT_CAPACITY};
