//! Text protocol spoken by the board firmware over the serial line.
//!
//! This module handles framing-free protocol content: command words and the
//! occupancy grid reply. The actual serial connection lifecycle lives in the
//! models layer.
//!
//! Querying occupancy is a `print` command; the board answers with a header
//! line followed by eight rows (rank 8 first) of eight space-separated cells,
//! where `0` marks an occupied square and `.` an empty one.

use shakmaty::{Bitboard, File, Rank, Square};
use thiserror::Error;

/// Header line preceding the occupancy grid.
pub const GRID_HEADER: &str = "Printing pieces";

/// Number of rows/columns in the grid reply.
pub const GRID_SIZE: usize = 8;

/// Reply content the board can produce that we refuse to interpret.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected header line in occupancy reply: {0:?}")]
    UnexpectedHeader(String),
    #[error("unexpected cell character in row {row} col {col}: {found:?}")]
    UnexpectedCell {
        row: usize,
        col: usize,
        found: String,
    },
    #[error("occupancy row {row} has {found} cells, expected {GRID_SIZE}")]
    WrongRowWidth { row: usize, found: usize },
    #[error("occupancy grid has {found} rows, expected {GRID_SIZE}")]
    WrongRowCount { found: usize },
}

/// Commands understood by the board firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    /// Ask the board to print its sensed occupancy grid.
    Print,
}

impl BoardCommand {
    /// The command word as sent on the wire (CRLF framing is the link's job).
    pub fn to_wire_string(self) -> &'static str {
        match self {
            BoardCommand::Print => "print",
        }
    }
}

/// Validate the header line that precedes the grid.
pub fn check_grid_header(line: &str) -> Result<(), ProtocolError> {
    if line == GRID_HEADER {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedHeader(line.to_string()))
    }
}

/// Parse the eight grid rows into an occupancy set.
///
/// Row 0 is rank 8; within a row, column 0 is file a. Oddly enough `0` is a
/// piece and `.` is empty - that is what the firmware prints.
pub fn parse_grid<S: AsRef<str>>(rows: &[S]) -> Result<Bitboard, ProtocolError> {
    if rows.len() != GRID_SIZE {
        return Err(ProtocolError::WrongRowCount { found: rows.len() });
    }
    let mut occupied = Bitboard::EMPTY;
    for (row, line) in rows.iter().enumerate() {
        let cells: Vec<&str> = line.as_ref().split_whitespace().collect();
        if cells.len() != GRID_SIZE {
            return Err(ProtocolError::WrongRowWidth {
                row,
                found: cells.len(),
            });
        }
        for (col, cell) in cells.iter().enumerate() {
            match *cell {
                "0" => {
                    let square =
                        Square::from_coords(File::new(col as u32), Rank::new(7 - row as u32));
                    occupied |= Bitboard::from(square);
                }
                "." => continue,
                other => {
                    return Err(ProtocolError::UnexpectedCell {
                        row,
                        col,
                        found: other.to_string(),
                    });
                }
            }
        }
    }
    Ok(occupied)
}
