//! Move application and winner determination.
//!
//! `advance` turns a position plus one legal move into the next position;
//! `winner` decides, for any assembled position, whether the game is over.

pub mod advance;
pub mod winner;

pub use winner::winner;
