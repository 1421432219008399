//! The logical position tracker.
//!
//! Owns the authoritative in-memory position, the reading history, and the
//! snapshot source. The position changes only through [`BoardTracker::commit`],
//! [`BoardTracker::reset_to_start`], [`BoardTracker::clear`], and the
//! initial-setup detection path; readers get cloned snapshots, never the live
//! value.

use log::debug;
use shakmaty::{Bitboard, Chess, Move, Position};

use crate::domain::history::SnapshotHistory;
use crate::domain::inference::{Inference, infer};
use crate::domain::occupancy::occupancy_of;
use crate::error::{LinkError, TrackerError};
use crate::models::link::SnapshotSource;

pub struct BoardTracker<S> {
    source: S,
    /// `None` until a game starts or the full starting setup is detected.
    position: Option<Chess>,
    history: SnapshotHistory,
}

impl<S: SnapshotSource> BoardTracker<S> {
    /// Start tracking with no position; the first full setup on the physical
    /// board will establish the standard start.
    pub fn new(source: S) -> Self {
        Self {
            source,
            position: None,
            history: SnapshotHistory::new(),
        }
    }

    /// A snapshot of the tracked position, if any.
    pub fn position(&self) -> Option<Chess> {
        self.position.clone()
    }

    /// Occupancy derived from the tracked position (empty when untracked).
    pub fn occupancy(&self) -> Bitboard {
        self.position.as_ref().map_or(Bitboard::EMPTY, occupancy_of)
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Read the sensors once and infer the move in progress, if any.
    ///
    /// A failed read propagates without touching the history or the position.
    pub fn poll(&mut self) -> Result<Option<Move>, LinkError> {
        let physical = self.source.read_occupancy()?;
        match infer(self.position.as_ref(), physical, &mut self.history) {
            Inference::Candidate(m) => Ok(Some(m)),
            Inference::SetupComplete => {
                debug!("all starting pieces placed, tracking the standard position");
                self.position = Some(Chess::default());
                Ok(None)
            }
            Inference::NoCandidate => Ok(None),
        }
    }

    /// Apply a confirmed, legal move and clear the reading history.
    pub fn commit(&mut self, m: &Move) -> Result<(), TrackerError> {
        let position = self.position.as_ref().ok_or(TrackerError::NoPosition)?;
        let next = position
            .clone()
            .play(m.clone())
            .map_err(|_| TrackerError::IllegalMove(format!("{m:?}")))?;
        self.position = Some(next);
        self.history.clear();
        debug!("committed move {m:?}");
        Ok(())
    }

    /// Track the standard starting position.
    pub fn reset_to_start(&mut self) {
        self.position = Some(Chess::default());
        self.history.clear();
    }

    /// Stop tracking any position.
    pub fn clear(&mut self) {
        self.position = None;
        self.history.clear();
    }
}
