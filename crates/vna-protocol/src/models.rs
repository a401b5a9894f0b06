//! VNA board model database
//!
//! This module contains information about specific board models: screen
//! geometry for the capture protocol and the datapoint counts the firmware
//! accepts.

/// Static description of a board model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardModel {
    /// Marketing/board name as reported by `info`
    pub name: &'static str,
    /// LCD width in pixels
    pub screen_width: usize,
    /// LCD height in pixels
    pub screen_height: usize,
    /// Datapoint count used when the caller does not pick one
    pub default_datapoints: u32,
    /// Datapoint counts the firmware accepts for a sweep
    pub valid_datapoints: &'static [u32],
}

impl BoardModel {
    /// Raw capture payload size for this board's screen
    pub const fn capture_len(&self) -> usize {
        crate::screen::payload_len(self.screen_width, self.screen_height)
    }
}

/// The original 2.8" NanoVNA board
pub const NANOVNA: BoardModel = BoardModel {
    name: "NanoVNA",
    screen_width: 320,
    screen_height: 240,
    default_datapoints: 101,
    valid_datapoints: &[11, 51, 101],
};

/// The NanoVNA-H hardware revision (same screen, same protocol)
pub const NANOVNA_H: BoardModel = BoardModel {
    name: "NanoVNA-H",
    screen_width: 320,
    screen_height: 240,
    default_datapoints: 101,
    valid_datapoints: &[11, 51, 101],
};

/// All known board models
pub const ALL_MODELS: &[BoardModel] = &[NANOVNA, NANOVNA_H];

/// Look up a board model by name (case-insensitive)
pub fn by_name(name: &str) -> Option<BoardModel> {
    ALL_MODELS
        .iter()
        .copied()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}
