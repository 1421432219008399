//! Move tracking core for a magnetic-piece-sensing digital chessboard.
//!
//! The board's reed switches report square occupancy only - no piece
//! identity, no color. This crate reconciles those readings against a legal
//! chess position to infer the move the players just made, including the
//! multi-step case of captures, and wraps the result in a confirm-then-commit
//! game session.
//!
//! Layering:
//! - `domain` - pure pieces: occupancy diffing, reading history, the serial
//!   text protocol, and the inference engine itself.
//! - `models` - stateful pieces: the serial link, the position tracker, the
//!   game, and the session state machine.
//!
//! Chess rules come from `shakmaty`; nothing here re-derives move legality.

pub mod domain;
pub mod error;
pub mod models;

pub use error::{GameError, LinkError, SessionError, TrackerError};
