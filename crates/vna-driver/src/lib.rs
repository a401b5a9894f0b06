//! VNA Driver Library
//!
//! Session driver for NanoVNA-family instruments over a blocking serial
//! link. The driver converts firmware-version-dependent protocol quirks
//! into one uniform contract:
//!
//! - firmware version is read once at connect time and fixes the sweep
//!   protocol variant (`sweep`, `scan`, or masked `scan`) for the session
//! - on the masked-scan path the frequency axis is derived locally and
//!   one device query feeds both measurement channels
//! - the binary screen capture holds the stream exclusively and restores
//!   the read timeout on every exit path
//!
//! All I/O is synchronous request/response on the calling thread; there
//! are no worker threads, no retries, and no internal queuing. Protocol
//! encoding and decoding live in the `vna-protocol` crate; this crate
//! owns the byte movement and session state.
//!
//! # Example
//!
//! ```no_run
//! use vna_driver::{FrequencyReader, NanoVna, SerialInterface, ValueReader};
//! use vna_protocol::DataChannel;
//!
//! # fn main() -> vna_driver::Result<()> {
//! let iface = SerialInterface::open("/dev/ttyACM0")?;
//! let mut vna = NanoVna::connect(iface)?;
//!
//! vna.set_sweep(1_000_000, 30_000_000)?;
//! let frequencies = vna.read_frequencies()?;
//! let s11 = vna.read_values(DataChannel::Channel0)?;
//! assert_eq!(frequencies.len(), s11.len());
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod error;
pub mod exec;
pub mod interface;

pub use driver::{FrequencyReader, NanoVna, ValueReader, CAPTURE_TIMEOUT};
pub use error::{Error, Result};
pub use exec::ResponseLines;
pub use interface::{Interface, SerialInterface, DEFAULT_BAUD, DEFAULT_TIMEOUT};
