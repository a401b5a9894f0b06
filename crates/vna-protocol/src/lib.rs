//! VNA Protocol Library
//!
//! This crate provides command encoding and response parsing for the
//! NanoVNA family's ASCII shell protocol, plus the binary screen-capture
//! sub-protocol. It is pure: no I/O happens here. The driver crate
//! (`vna-driver`) moves bytes; this crate decides what they mean.
//!
//! The protocol went through three generations of sweep configuration,
//! gated on the firmware version the device reports at connect time:
//!
//! - **Sweep**: the legacy `sweep <start> <stop> <points>` command
//! - **Scan** (firmware >= 0.2.0): the `scan` command
//! - **ScanMask** (firmware >= 0.7.1): `scan` with a channel mask, which
//!   multiplexes both channels' data into one query and omits the
//!   frequency axis entirely (the host derives it, see [`sweep`])
//!
//! # Example
//!
//! ```rust
//! use vna_protocol::{Command, SweepMethod, SweepRange, Version};
//!
//! let version: Version = "0.7.1-5-g3a8f".parse().unwrap();
//! assert_eq!(SweepMethod::for_version(version), SweepMethod::ScanMask);
//!
//! let range = SweepRange::new(1_000_000, 2_000_000, 101).unwrap();
//! assert_eq!(
//!     Command::ScanMasked(range).encode(),
//!     b"scan 1000000 2000000 101 0b110\r"
//! );
//! ```

pub mod command;
pub mod error;
pub mod models;
pub mod screen;
pub mod sweep;
pub mod version;

pub use command::{Command, DataChannel, SCAN_MASK};
pub use error::ParseError;
pub use models::BoardModel;
pub use screen::{decode_rgb565, PixelFrame};
pub use sweep::{parse_masked_line, ChannelSample, SweepRange};
pub use version::Version;

/// Which sweep-configuration protocol generation a session uses
///
/// Selected exactly once from the firmware [`Version`] and treated as
/// session-fixed state afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SweepMethod {
    /// Legacy `sweep` command
    Sweep,
    /// `scan` command (firmware >= 0.2.0)
    Scan,
    /// Masked `scan` with multiplexed channels (firmware >= 0.7.1)
    ScanMask,
}

impl SweepMethod {
    /// Pick the sweep method for a firmware version
    ///
    /// Thresholds are inclusive lower bounds; the first match in
    /// descending order wins.
    pub fn for_version(version: Version) -> Self {
        if version >= version::SCAN_MASK_MIN {
            SweepMethod::ScanMask
        } else if version >= version::SCAN_MIN {
            SweepMethod::Scan
        } else {
            SweepMethod::Sweep
        }
    }

    /// The feature gate this method corresponds to, if any
    pub fn feature(&self) -> Option<Feature> {
        match self {
            SweepMethod::Sweep => None,
            SweepMethod::Scan => Some(Feature::ScanCommand),
            SweepMethod::ScanMask => Some(Feature::ScanMaskCommand),
        }
    }

    /// Returns a human-readable name for the method
    pub fn name(&self) -> &'static str {
        match self {
            SweepMethod::Sweep => "sweep",
            SweepMethod::Scan => "scan",
            SweepMethod::ScanMask => "scan_mask",
        }
    }
}

/// A capability enabled above a firmware version threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feature {
    /// Device understands the `scan` command
    ScanCommand,
    /// Device understands the masked `scan` variant
    ScanMaskCommand,
    /// Device can transfer its screen contents
    Screenshots,
}

impl Feature {
    /// Returns a human-readable name for the feature
    pub fn name(&self) -> &'static str {
        match self {
            Feature::ScanCommand => "Scan command",
            Feature::ScanMaskCommand => "Scan mask command",
            Feature::Screenshots => "Screenshots",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_selection_thresholds() {
        let cases = [
            ("0.0.1", SweepMethod::Sweep),
            ("0.1.9", SweepMethod::Sweep),
            ("0.2.0", SweepMethod::Scan),
            ("0.4.5", SweepMethod::Scan),
            ("0.7.0", SweepMethod::Scan),
            ("0.7.1", SweepMethod::ScanMask),
            ("1.0.0", SweepMethod::ScanMask),
        ];
        for (text, expected) in cases {
            let version: Version = text.parse().unwrap();
            assert_eq!(
                SweepMethod::for_version(version),
                expected,
                "version {text}"
            );
        }
    }

    #[test]
    fn method_features() {
        assert_eq!(SweepMethod::Sweep.feature(), None);
        assert_eq!(SweepMethod::Scan.feature(), Some(Feature::ScanCommand));
        assert_eq!(
            SweepMethod::ScanMask.feature(),
            Some(Feature::ScanMaskCommand)
        );
    }

    #[test]
    fn feature_names() {
        assert_eq!(Feature::ScanCommand.name(), "Scan command");
        assert_eq!(Feature::ScanMaskCommand.name(), "Scan mask command");
    }
}
