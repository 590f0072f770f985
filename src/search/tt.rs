//! Transposition table used for move ordering.
//!
//! Maps a structural position key to the last score computed for it, from
//! the perspective of the side to move in that position. Scores only ever
//! reorder children; a hit never replaces a recursive search.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::board::PositionKey;

/// Default number of entries kept before new inserts are dropped.
pub const DEFAULT_TT_CAPACITY: usize = 1 << 20;

/// Thread-safe score memo with a fixed capacity.
///
/// Readers always see either the previous or the new value of an entry.
/// Once full, new keys are ignored while existing keys still update.
#[derive(Debug)]
pub struct TranspositionTable {
    map: RwLock<HashMap<PositionKey, f64>>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        TranspositionTable {
            map: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Previously stored score, if any. A poisoned lock reads as a miss.
    pub fn get(&self, key: &PositionKey) -> Option<f64> {
        self.map.read().ok()?.get(key).copied()
    }

    /// Stores a score, best-effort.
    pub fn insert(&self, key: PositionKey, score: f64) {
        let Ok(mut map) = self.map.write() else {
            return;
        };
        if map.len() >= self.capacity && !map.contains_key(&key) {
            return;
        }
        map.insert(key, score);
    }

    pub fn len(&self) -> usize {
        self.map.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.map.write() {
            map.clear();
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(DEFAULT_TT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::board::{
        default_mr_x_tickets, demo_setup, Detective, Piece, Player, Position,
        DEFAULT_DETECTIVE_TICKETS,
    };

    fn key_at(mr_x: u16) -> PositionKey {
        Position::start(
            Arc::new(demo_setup()),
            Player::new(Piece::MrX, default_mr_x_tickets(1), mr_x),
            vec![Player::new(
                Piece::Detective(Detective::Red),
                DEFAULT_DETECTIVE_TICKETS,
                1,
            )],
        )
        .unwrap()
        .key()
    }

    #[test]
    fn insert_and_get() {
        let tt = TranspositionTable::new(8);
        assert_eq!(tt.get(&key_at(13)), None);
        tt.insert(key_at(13), 2.5);
        assert_eq!(tt.get(&key_at(13)), Some(2.5));
        tt.insert(key_at(13), -1.0);
        assert_eq!(tt.get(&key_at(13)), Some(-1.0));
        assert_eq!(tt.len(), 1);
    }

    #[test]
    fn full_table_drops_new_keys() {
        let tt = TranspositionTable::new(1);
        tt.insert(key_at(13), 1.0);
        tt.insert(key_at(14), 2.0);
        assert_eq!(tt.get(&key_at(14)), None);
        tt.insert(key_at(13), 3.0);
        assert_eq!(tt.get(&key_at(13)), Some(3.0));
    }

    #[test]
    fn concurrent_writers_never_corrupt() {
        let tt = Arc::new(TranspositionTable::new(64));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tt = Arc::clone(&tt);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        tt.insert(key_at(13), f64::from(i * 100 + n));
                        let v = tt.get(&key_at(13)).unwrap();
                        assert!(v.is_finite());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(tt.len(), 1);
    }
}
