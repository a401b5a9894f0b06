//! Firmware version parsing and ordering
//!
//! NanoVNA firmware reports its version as a dotted numeric string
//! (`0.7.1`), sometimes with a trailing build suffix (`0.7.1-5-g3a8f`).
//! Feature gating compares against literal thresholds, so [`Version`] is a
//! plain ordered triple and the suffix is ignored entirely.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A firmware version as an ordered `(major, minor, patch)` triple
///
/// Ordering is derived field by field, which matches how the firmware
/// numbers its releases. The patch component defaults to zero when the
/// reported string only has two fields (`1.0` == `1.0.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    /// Major version component
    pub major: u32,
    /// Minor version component
    pub minor: u32,
    /// Patch version component
    pub patch: u32,
}

/// First firmware release that understands the `scan` command
pub const SCAN_MIN: Version = Version::new(0, 2, 0);

/// First firmware release that understands the masked `scan` variant
pub const SCAN_MASK_MIN: Version = Version::new(0, 7, 1);

impl Version {
    /// Create a version from its components
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Split a leading run of ASCII digits off `s`
///
/// Returns the parsed number and the remainder, or `None` if `s` does not
/// start with a digit.
fn take_number(s: &str) -> Option<(u32, &str)> {
    let digits = s.len() - s.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let value = s[..digits].parse().ok()?;
    Some((value, &s[digits..]))
}

impl FromStr for Version {
    type Err = ParseError;

    /// Parse `major.minor[.patch][suffix]`, ignoring any trailing suffix
    fn from_str(s: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidVersion(s.to_string());

        let rest = s.trim();
        let (major, rest) = take_number(rest).ok_or_else(invalid)?;
        let rest = rest.strip_prefix('.').ok_or_else(invalid)?;
        let (minor, rest) = take_number(rest).ok_or_else(invalid)?;

        // The patch field and anything after it are optional. Build
        // suffixes like "-5-g3a8f" hang off the patch number directly.
        let patch = match rest.strip_prefix('.').and_then(take_number) {
            Some((patch, _)) => patch,
            None => 0,
        };

        Ok(Version::new(major, minor, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_three_fields() {
        let v: Version = "0.7.1".parse().unwrap();
        assert_eq!(v, Version::new(0, 7, 1));
    }

    #[test]
    fn parse_two_fields_defaults_patch() {
        let v: Version = "1.0".parse().unwrap();
        assert_eq!(v, Version::new(1, 0, 0));
    }

    #[test]
    fn parse_ignores_build_suffix() {
        let v: Version = "0.7.1-5-g3a8f2c".parse().unwrap();
        assert_eq!(v, Version::new(0, 7, 1));

        let v: Version = "0.4.5 (ch)".parse().unwrap();
        assert_eq!(v, Version::new(0, 4, 5));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("fw".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
        assert!("7".parse::<Version>().is_err());
    }

    #[test]
    fn ordering_spans_component_boundaries() {
        let v091: Version = "0.9.1".parse().unwrap();
        let v0100: Version = "0.10.0".parse().unwrap();
        assert!(v091 < v0100);
        assert!(Version::new(1, 0, 0) > Version::new(0, 99, 99));
    }

    #[test]
    fn threshold_constants() {
        assert_eq!(SCAN_MIN, Version::new(0, 2, 0));
        assert_eq!(SCAN_MASK_MIN, Version::new(0, 7, 1));
        assert!(SCAN_MIN < SCAN_MASK_MIN);
    }

    #[test]
    fn display_round_trips() {
        let v = Version::new(0, 7, 1);
        assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
    }

    proptest! {
        #[test]
        fn ordering_matches_tuple_ordering(
            a in (0u32..100, 0u32..100, 0u32..100),
            b in (0u32..100, 0u32..100, 0u32..100),
        ) {
            let va = Version::new(a.0, a.1, a.2);
            let vb = Version::new(b.0, b.1, b.2);
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }

        #[test]
        fn parse_never_panics(s in "\\PC*") {
            let _ = s.parse::<Version>();
        }
    }
}
