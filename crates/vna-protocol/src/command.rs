//! Command encoding for the ASCII shell protocol
//!
//! The firmware exposes a line-oriented shell: commands are plain ASCII
//! terminated by a carriage return, responses are newline-delimited text
//! ending in a `ch>` prompt. The one exception is `capture`, whose response
//! body is a raw binary frame (see [`crate::screen`]).

use std::fmt;

use crate::sweep::SweepRange;

/// Channel mask for the multiplexed `scan` variant
///
/// Selects which device-internal channels are folded into the response.
/// The value is an opaque protocol constant; the driver never interprets
/// its bits.
pub const SCAN_MASK: &str = "0b110";

/// One of the two logical measurement channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataChannel {
    /// Channel 0 (reflection port)
    Channel0,
    /// Channel 1 (through port)
    Channel1,
}

impl DataChannel {
    /// The channel's index in `data <n>` commands
    pub fn index(&self) -> u8 {
        match self {
            DataChannel::Channel0 => 0,
            DataChannel::Channel1 => 1,
        }
    }
}

/// A command understood by the firmware shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Configure a legacy linear sweep: `sweep <start> <stop> <points>`
    Sweep(SweepRange),
    /// Configure a scan-mode sweep: `scan <start> <stop> <points>`
    Scan(SweepRange),
    /// Run a multiplexed scan: `scan <start> <stop> <points> 0b110`
    ScanMasked(SweepRange),
    /// Halt sweeping
    Pause,
    /// Resume sweeping after a reset or pause
    Resume,
    /// Trigger the binary screen transfer
    Capture,
    /// Query the firmware version string
    Version,
    /// Ask the device to list the sweep's frequency axis
    Frequencies,
    /// Read one channel's values: `data <n>`
    Data(DataChannel),
}

impl Command {
    /// Encode to wire format: the command text plus the CR terminator
    pub fn encode(&self) -> Vec<u8> {
        format!("{}\r", self).into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Sweep(r) => {
                write!(f, "sweep {} {} {}", r.start, r.stop, r.datapoints)
            }
            Command::Scan(r) => {
                write!(f, "scan {} {} {}", r.start, r.stop, r.datapoints)
            }
            Command::ScanMasked(r) => {
                write!(
                    f,
                    "scan {} {} {} {}",
                    r.start, r.stop, r.datapoints, SCAN_MASK
                )
            }
            Command::Pause => f.write_str("pause"),
            Command::Resume => f.write_str("resume"),
            Command::Capture => f.write_str("capture"),
            Command::Version => f.write_str("version"),
            Command::Frequencies => f.write_str("frequencies"),
            Command::Data(channel) => write!(f, "data {}", channel.index()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> SweepRange {
        SweepRange::new(27_000_000, 30_000_000, 101).unwrap()
    }

    #[test]
    fn encode_sweep() {
        assert_eq!(
            Command::Sweep(range()).encode(),
            b"sweep 27000000 30000000 101\r"
        );
    }

    #[test]
    fn encode_scan() {
        assert_eq!(
            Command::Scan(range()).encode(),
            b"scan 27000000 30000000 101\r"
        );
    }

    #[test]
    fn encode_scan_masked() {
        assert_eq!(
            Command::ScanMasked(range()).encode(),
            b"scan 27000000 30000000 101 0b110\r"
        );
    }

    #[test]
    fn encode_bare_commands() {
        assert_eq!(Command::Resume.encode(), b"resume\r");
        assert_eq!(Command::Pause.encode(), b"pause\r");
        assert_eq!(Command::Capture.encode(), b"capture\r");
        assert_eq!(Command::Version.encode(), b"version\r");
        assert_eq!(Command::Frequencies.encode(), b"frequencies\r");
    }

    #[test]
    fn encode_data_channels() {
        assert_eq!(Command::Data(DataChannel::Channel0).encode(), b"data 0\r");
        assert_eq!(Command::Data(DataChannel::Channel1).encode(), b"data 1\r");
    }
}
