//! Error types for protocol parsing and encoding

use thiserror::Error;

/// Errors that can occur while parsing device responses
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Version string did not match the `major.minor[.patch][suffix]` shape
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),

    /// A frequency field could not be parsed as an integer number of Hz
    #[error("invalid frequency: {0:?}")]
    InvalidFrequency(String),

    /// Sweep range violates start <= stop or datapoints >= 1
    #[error("invalid sweep range: start {start} Hz, stop {stop} Hz, {datapoints} points")]
    InvalidSweepRange {
        start: u64,
        stop: u64,
        datapoints: u32,
    },

    /// A multiplexed scan response line did not split into exactly four tokens
    #[error("malformed data line ({tokens} tokens, expected 4): {line:?}")]
    MalformedDataLine { tokens: usize, line: String },

    /// A binary capture payload was shorter than the fixed frame size
    #[error("short capture payload: expected {expected} bytes, got {actual}")]
    ShortPayload { expected: usize, actual: usize },
}
