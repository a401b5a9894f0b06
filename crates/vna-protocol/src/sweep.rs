//! Sweep range handling and scan-mask response parsing
//!
//! Firmware new enough to use the masked `scan` command never reports the
//! frequency axis itself; the host derives it from the configured range.
//! The derivation here reproduces the device's own index-to-frequency
//! mapping, including the round-half-to-even tie-break, so that data index
//! `i` lines up with `frequencies()[i]` exactly.

use crate::error::ParseError;

/// A configured sweep: start/stop frequencies and the number of samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SweepRange {
    /// Sweep start frequency in Hz
    pub start: u64,
    /// Sweep stop frequency in Hz
    pub stop: u64,
    /// Number of discrete samples across the range
    pub datapoints: u32,
}

impl SweepRange {
    /// Create a sweep range, validating `start <= stop` and `datapoints >= 1`
    pub fn new(start: u64, stop: u64, datapoints: u32) -> Result<Self, ParseError> {
        if start > stop || datapoints == 0 {
            return Err(ParseError::InvalidSweepRange {
                start,
                stop,
                datapoints,
            });
        }
        Ok(Self {
            start,
            stop,
            datapoints,
        })
    }

    /// Derive the frequency for each data index as a linear progression
    ///
    /// `f[i] = round(start + i * (stop - start) / (datapoints - 1))`, with
    /// halves rounded to even. A single-point sweep has no step and yields
    /// just the start frequency.
    pub fn frequencies(&self) -> Vec<u64> {
        if self.datapoints == 1 {
            return vec![self.start];
        }
        let step = (self.stop - self.start) as f64 / (self.datapoints - 1) as f64;
        (0..self.datapoints)
            .map(|i| round_half_even(self.start as f64 + i as f64 * step))
            .collect()
    }
}

/// Round to the nearest integer, ties to even
///
/// The interpolated frequencies must match what the firmware associates
/// with each data index, and the firmware's host-side reference rounds
/// halves to the even neighbor rather than away from zero.
fn round_half_even(x: f64) -> u64 {
    let floor = x.floor();
    let frac = x - floor;
    let down = floor as u64;
    if frac > 0.5 {
        down + 1
    } else if frac < 0.5 {
        down
    } else if down % 2 == 0 {
        down
    } else {
        down + 1
    }
}

/// One sweep point's values for both multiplexed channels
///
/// Each field is the raw two-token text the firmware produced for that
/// channel, e.g. `"-0.0316 0.0013"`. The driver hands these through
/// verbatim; interpreting them as complex values is the application's job.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSample {
    /// Channel 0 value text
    pub ch0: String,
    /// Channel 1 value text
    pub ch1: String,
}

/// Split one masked-scan response line into its two channel samples
///
/// With the mask the driver uses, every line carries exactly four
/// whitespace-separated tokens: two for channel 0, two for channel 1.
/// Anything else means the response stream is out of sync.
pub fn parse_masked_line(line: &str) -> Result<ChannelSample, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(ParseError::MalformedDataLine {
            tokens: tokens.len(),
            line: line.to_string(),
        });
    }
    Ok(ChannelSample {
        ch0: format!("{} {}", tokens[0], tokens[1]),
        ch1: format!("{} {}", tokens[2], tokens[3]),
    })
}
