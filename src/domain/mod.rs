//! Pure domain layer: occupancy math, reading history, wire protocol, and
//! move inference. No I/O and no connection state here.

pub mod history;
pub mod inference;
pub mod occupancy;
pub mod protocol;

pub use history::SnapshotHistory;
pub use inference::{Inference, find_legal_move, infer};
pub use occupancy::{diff, occupancy_of, starting_occupancy};
pub use protocol::{BoardCommand, GRID_HEADER, ProtocolError, parse_grid};
