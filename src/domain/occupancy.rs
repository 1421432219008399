//! Occupancy sets and the difference engine.
//!
//! The board's sensors report which squares hold a piece, nothing more. An
//! occupancy set is a [`Bitboard`]; comparing the physical reading against the
//! occupancy derived from the tracked position is the first step of every
//! inference poll.

use shakmaty::{Bitboard, Chess, Position};

/// Squares newly occupied and newly vacated, in that order.
///
/// `additions` are squares present in `physical` but not in `current`;
/// `removals` the reverse. Empty sets mean the board matches the tracked
/// position.
pub fn diff(current: Bitboard, physical: Bitboard) -> (Bitboard, Bitboard) {
    let additions = physical & !current;
    let removals = current & !physical;
    (additions, removals)
}

/// The 32 squares occupied in the standard starting position.
pub fn starting_occupancy() -> Bitboard {
    Chess::default().board().occupied()
}

/// Occupancy derived from a position. Recomputed on every call, never cached.
pub fn occupancy_of(position: &Chess) -> Bitboard {
    position.board().occupied()
}
