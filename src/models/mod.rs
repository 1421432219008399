//! Stateful models layered over the pure domain: the board link, the
//! position tracker, the game, and the session that ties them together.

pub mod board;
pub mod game;
pub mod link;
pub mod mock;
pub mod session;

pub use board::BoardTracker;
pub use game::{Game, GameOutcome};
pub use link::{BoardLink, SnapshotSource};
pub use mock::MockSensor;
pub use session::{Session, SessionState};
