//! Error types for reedboard operations.

use thiserror::Error;

use crate::domain::protocol::ProtocolError;
use crate::models::session::SessionState;

/// Errors from talking to the physical board.
#[derive(Debug, Error)]
pub enum LinkError {
    /// A read or command was attempted with no active connection.
    #[error("no active connection to the board")]
    NotConnected,

    /// The serial device could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O failed mid-exchange (including read timeouts).
    #[error("board I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The board replied with something we refuse to interpret.
    #[error("bad response from board: {0}")]
    BadResponse(#[from] ProtocolError),
}

/// Errors from the logical position tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// No position is being tracked (before setup or after a reset).
    #[error("no position is being tracked")]
    NoPosition,

    /// The move is not legal in the tracked position.
    #[error("move is not legal in the tracked position: {0}")]
    IllegalMove(String),
}

/// Errors from game-level actions (draws, resignation).
#[derive(Debug, Error)]
pub enum GameError {
    #[error("cannot claim draw")]
    CannotClaimDraw,

    #[error("draw already offered")]
    DrawAlreadyOffered,

    #[error("no draw offered")]
    NoDrawOffered,
}

/// Errors from the game session state machine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not allowed in the session's current state.
    #[error("operation not allowed in state {state:?}")]
    InvalidState { state: SessionState },

    /// There is no candidate move to confirm.
    #[error("no candidate move to confirm")]
    NoCandidate,

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error(transparent)]
    Game(#[from] GameError),
}
