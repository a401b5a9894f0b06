//! Byte-level interface to the instrument
//!
//! The [`Interface`] trait abstracts over the physical link. The driver
//! engine operates on an `Interface` rather than directly on a serial
//! port, enabling both real hardware control and deterministic testing
//! with the simulated device from the `vna-sim` crate.
//!
//! Everything is synchronous: the protocol is strictly request/response
//! over a single stream, and the calling thread blocks until data arrives
//! or the read timeout elapses. There are no worker threads here.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use crate::error::{Error, Result};

/// Synchronous byte-level transport to the instrument
///
/// Line reads are tolerant of the firmware's prompt behavior: the `ch>`
/// prompt is sent without a trailing newline, so a read that times out
/// with buffered bytes returns those bytes as a partial line. A timeout
/// with nothing received at all is an [`Error::Timeout`].
pub trait Interface: Send {
    /// Whether the link is currently usable
    fn is_connected(&self) -> bool;

    /// Send raw bytes to the device
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read one line of text, up to and including a newline
    ///
    /// Returns the line without its terminator. On timeout, returns any
    /// partially accumulated line, or [`Error::Timeout`] if nothing was
    /// received.
    fn read_line(&mut self) -> Result<String>;

    /// Read up to `len` raw bytes, subject to the current timeout
    ///
    /// Returns short when the device stops sending before `len` bytes
    /// arrive; the caller decides whether short is fatal.
    fn read(&mut self, len: usize) -> Result<Vec<u8>>;

    /// The current read timeout
    fn timeout(&self) -> Duration;

    /// Replace the read timeout
    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;

    /// Discard any currently buffered input
    fn drain(&mut self) -> Result<()>;
}

impl<T: Interface + ?Sized> Interface for Box<T> {
    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    fn read_line(&mut self) -> Result<String> {
        (**self).read_line()
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        (**self).read(len)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        (**self).set_timeout(timeout)
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }
}

/// Default serial read timeout
///
/// Long enough for the slowest text responses at 115200 baud, short
/// enough that prompt detection (which rides on a timeout) stays snappy.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default baud rate for NanoVNA boards
pub const DEFAULT_BAUD: u32 = 115_200;

/// [`Interface`] implementation over a real serial port
pub struct SerialInterface {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialInterface {
    /// Open a serial port at the default NanoVNA baud rate
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_baud(path, DEFAULT_BAUD)
    }

    /// Open a serial port at an explicit baud rate
    pub fn open_with_baud(path: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(DEFAULT_TIMEOUT)
            .open()
            .map_err(std::io::Error::from)?;
        tracing::debug!(path, baud, "serial port opened");
        Ok(Self { port })
    }
}

impl Interface for SerialInterface {
    fn is_connected(&self) -> bool {
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.port.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    buf.push(byte[0]);
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        if buf.is_empty() {
            return Err(Error::Timeout);
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let mut filled = 0;
        while filled < len {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(e.into()),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }

    fn timeout(&self) -> Duration {
        self.port.timeout()
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(std::io::Error::from)?;
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.port
            .clear(serialport::ClearBuffer::Input)
            .map_err(std::io::Error::from)?;
        Ok(())
    }
}
