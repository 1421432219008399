//! Connection to the physical board.
//!
//! The link owns the byte stream to the board firmware, frames protocol
//! commands with CRLF, and turns the grid reply into an occupancy set. It is
//! generic over the stream so tests can drive the exchange with an in-memory
//! pipe; real hardware goes through [`BoardLink::open_serial`].

use std::io::{Read, Write};
use std::time::Duration;

use log::debug;
use serialport::SerialPort;
use shakmaty::Bitboard;

use crate::domain::protocol::{self, BoardCommand, GRID_SIZE};
use crate::error::LinkError;

/// Baud rate of the board firmware's serial console.
pub const BAUD_RATE: u32 = 9_600;

/// Bound on a single blocking read from the board.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Anything that can produce an occupancy reading on demand.
pub trait SnapshotSource {
    /// Read which squares currently hold a piece.
    fn read_occupancy(&mut self) -> Result<Bitboard, LinkError>;
}

/// A connection to the board over a bidirectional byte stream.
pub struct BoardLink<T> {
    stream: Option<T>,
}

impl<T> BoardLink<T> {
    /// Create a link with no active connection.
    pub fn new() -> Self {
        Self { stream: None }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drop the active connection.
    pub fn detach(&mut self) -> Result<(), LinkError> {
        if self.stream.take().is_none() {
            return Err(LinkError::NotConnected);
        }
        debug!("detached from board");
        Ok(())
    }
}

impl<T: Read + Write> BoardLink<T> {
    /// Take ownership of a connected stream.
    ///
    /// Writes a bare double CRLF first so any partial input in the firmware's
    /// command buffer is discarded.
    pub fn attach(&mut self, mut stream: T) -> Result<(), LinkError> {
        stream.write_all(b"\r\n\r\n")?;
        stream.flush()?;
        self.stream = Some(stream);
        debug!("attached to board");
        Ok(())
    }

    fn send_command(&mut self, command: BoardCommand) -> Result<(), LinkError> {
        let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
        write!(stream, "{}\r\n", command.to_wire_string())?;
        stream.flush()?;
        Ok(())
    }

    /// Read one CRLF-terminated line, without the terminator.
    fn read_line(&mut self) -> Result<String, LinkError> {
        let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            stream.read_exact(&mut byte)?;
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }
        while line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}

impl BoardLink<Box<dyn SerialPort>> {
    /// Open the serial device the board is attached to.
    pub fn open_serial(port: &str) -> Result<Self, LinkError> {
        let stream = serialport::new(port, BAUD_RATE)
            .timeout(READ_TIMEOUT)
            .open()?;
        let mut link = Self::new();
        link.attach(stream)?;
        debug!("connected to board on {port}");
        Ok(link)
    }
}

impl<T> Default for BoardLink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Read + Write> SnapshotSource for BoardLink<T> {
    fn read_occupancy(&mut self) -> Result<Bitboard, LinkError> {
        self.send_command(BoardCommand::Print)?;
        let header = self.read_line()?;
        protocol::check_grid_header(&header)?;
        let mut rows = Vec::with_capacity(GRID_SIZE);
        for _ in 0..GRID_SIZE {
            rows.push(self.read_line()?);
        }
        Ok(protocol::parse_grid(&rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::occupancy::starting_occupancy;
    use std::io::{self, Cursor};

    /// In-memory stand-in for the board's serial console.
    struct FakeBoard {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl FakeBoard {
        fn replying(reply: &str) -> Self {
            Self {
                input: Cursor::new(reply.as_bytes().to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for FakeBoard {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for FakeBoard {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn starting_reply() -> String {
        let mut reply = String::from("Printing pieces\r\n");
        for row in [
            "0 0 0 0 0 0 0 0",
            "0 0 0 0 0 0 0 0",
            ". . . . . . . .",
            ". . . . . . . .",
            ". . . . . . . .",
            ". . . . . . . .",
            "0 0 0 0 0 0 0 0",
            "0 0 0 0 0 0 0 0",
        ] {
            reply.push_str(row);
            reply.push_str("\r\n");
        }
        reply
    }

    #[test]
    fn test_read_occupancy_exchange() {
        let mut link = BoardLink::new();
        link.attach(FakeBoard::replying(&starting_reply())).unwrap();
        let occupancy = link.read_occupancy().unwrap();
        assert_eq!(occupancy, starting_occupancy());

        let sent = link.stream.take().unwrap().output;
        assert_eq!(sent, b"\r\n\r\nprint\r\n");
    }

    #[test]
    fn test_read_without_connection_fails() {
        let mut link: BoardLink<FakeBoard> = BoardLink::new();
        assert!(matches!(
            link.read_occupancy(),
            Err(LinkError::NotConnected)
        ));
    }

    #[test]
    fn test_detach_without_connection_fails() {
        let mut link: BoardLink<FakeBoard> = BoardLink::new();
        assert!(matches!(link.detach(), Err(LinkError::NotConnected)));
    }

    #[test]
    fn test_detach_then_read_fails() {
        let mut link = BoardLink::new();
        link.attach(FakeBoard::replying(&starting_reply())).unwrap();
        link.detach().unwrap();
        assert!(matches!(
            link.read_occupancy(),
            Err(LinkError::NotConnected)
        ));
    }

    #[test]
    fn test_bad_header_is_a_bad_response() {
        let mut link = BoardLink::new();
        link.attach(FakeBoard::replying("Printing garbage\r\n"))
            .unwrap();
        assert!(matches!(
            link.read_occupancy(),
            Err(LinkError::BadResponse(_))
        ));
    }

    #[test]
    fn test_bad_cell_is_a_bad_response() {
        let reply = starting_reply().replace(". . . . . . . .", ". . ? . . . . .");
        let mut link = BoardLink::new();
        link.attach(FakeBoard::replying(&reply)).unwrap();
        assert!(matches!(
            link.read_occupancy(),
            Err(LinkError::BadResponse(_))
        ));
    }

    #[test]
    fn test_truncated_reply_is_an_io_error() {
        let mut link = BoardLink::new();
        link.attach(FakeBoard::replying("Printing pieces\r\n0 0 0"))
            .unwrap();
        assert!(matches!(link.read_occupancy(), Err(LinkError::Io(_))));
    }
}
