//! History of physical occupancy readings since the last committed move.
//!
//! Polling runs much faster than a human hand, so most readings repeat the
//! previous one. The buffer keeps only the distinct intermediate states: a
//! capture gesture (capturer lifted, victim lifted, capturer placed) leaves a
//! short trail here that is the only way to tell which square the capturer
//! landed on.

use shakmaty::Bitboard;

/// Ordered occupancy readings with adjacent duplicates collapsed.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    entries: Vec<Bitboard>,
}

impl SnapshotHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading unless it equals the most recent entry.
    pub fn record(&mut self, snapshot: Bitboard) {
        if self.entries.last() != Some(&snapshot) {
            self.entries.push(snapshot);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The full ordered sequence, oldest first.
    pub fn entries(&self) -> &[Bitboard] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
