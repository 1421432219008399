//! Mock snapshot source for tests and hardware-free development.

use shakmaty::{Bitboard, Square};

use crate::domain::occupancy::starting_occupancy;
use crate::error::LinkError;
use crate::models::link::SnapshotSource;

/// In-memory sensor: reports whatever occupancy it was told to hold.
#[derive(Debug, Clone)]
pub struct MockSensor {
    occupied: Bitboard,
}

impl MockSensor {
    /// A board with all 32 pieces on their starting squares.
    pub fn new() -> Self {
        Self {
            occupied: starting_occupancy(),
        }
    }

    /// A board with no pieces placed.
    pub fn empty() -> Self {
        Self {
            occupied: Bitboard::EMPTY,
        }
    }

    /// Toggle piece presence at the given square.
    pub fn toggle(&mut self, square: Square) {
        self.occupied.toggle(square);
    }

    /// Replace the whole reading.
    pub fn set_occupancy(&mut self, occupied: Bitboard) {
        self.occupied = occupied;
    }

    pub fn occupancy(&self) -> Bitboard {
        self.occupied
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for MockSensor {
    fn read_occupancy(&mut self) -> Result<Bitboard, LinkError> {
        Ok(self.occupied)
    }
}
