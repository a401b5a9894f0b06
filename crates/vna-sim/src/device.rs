//! Simulated NanoVNA device
//!
//! [`SimVna`] speaks the firmware shell protocol from the device side:
//! commands are echoed, responses end in the `ch>` prompt, and `capture`
//! answers with the raw RGB565 frame. It implements the driver's
//! [`Interface`] trait, so the full driver stack runs against it
//! unchanged. Fault injection covers the failure modes the driver has to
//! survive: a mute device, truncated capture payloads, and malformed scan
//! lines.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;
use vna_driver::{Error, Interface, Result};
use vna_protocol::{models, BoardModel, SweepRange};

/// Injectable device misbehavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Device stops answering entirely; every read times out
    Mute,
    /// Truncate the next capture payload to this many bytes
    ShortCapture(usize),
    /// Emit a three-token line at this index of the next masked scan
    MalformedScanLine(usize),
}

/// Configuration for creating a simulated device
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Version string the firmware reports (suffixes allowed)
    pub version: String,
    /// Board model, for screen geometry
    pub board: BoardModel,
    /// RGB565 value the simulated LCD is uniformly filled with
    pub fill_pixel: u16,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            version: "0.7.1".to_string(),
            board: models::NANOVNA,
            // A NanoVNA's idle screen is mostly dark; any value works,
            // tests just need to know it.
            fill_pixel: 0x0000,
        }
    }
}

/// A simulated NanoVNA behind the driver's [`Interface`] trait
#[derive(Debug)]
pub struct SimVna {
    config: SimConfig,
    sweep: SweepRange,
    paused: bool,
    /// Bytes the device has produced but the host has not read yet
    pending: VecDeque<u8>,
    /// Host bytes accumulated until a carriage return completes a command
    input: Vec<u8>,
    timeout: Duration,
    connected: bool,
    fault: Option<Fault>,
    received: Vec<String>,
}

impl Default for SimVna {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl SimVna {
    /// Create a simulated device from configuration
    pub fn new(config: SimConfig) -> Self {
        // Matches real firmware's power-on sweep.
        let sweep = SweepRange {
            start: 27_000_000,
            stop: 30_000_000,
            datapoints: config.board.default_datapoints,
        };
        Self {
            config,
            sweep,
            paused: false,
            pending: VecDeque::new(),
            input: Vec::new(),
            timeout: Duration::from_millis(500),
            connected: true,
            fault: None,
            received: Vec::new(),
        }
    }

    /// Create a simulated device reporting the given firmware version
    pub fn with_version(version: &str) -> Self {
        Self::new(SimConfig {
            version: version.to_string(),
            ..SimConfig::default()
        })
    }

    /// Arm a fault for the next matching exchange
    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    /// Simulate the cable being pulled
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Every command line the device has received, in order
    pub fn received(&self) -> &[String] {
        &self.received
    }

    /// Whether sweeping is currently paused
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// The sweep range the device currently holds
    pub fn sweep(&self) -> SweepRange {
        self.sweep
    }

    fn push_text(&mut self, text: &str) {
        self.pending.extend(text.as_bytes());
    }

    /// Deterministic measurement for data index `i`: two tokens per
    /// channel, distinct between channels so tests can tell them apart
    fn point_tokens(&self, i: u32) -> (String, String) {
        let t = i as f64 / self.sweep.datapoints.max(2) as f64;
        let ch0 = format!("{:.9} {:.9}", 0.5 - t, t - 0.25);
        let ch1 = format!("{:.9} {:.9}", t, -t);
        (ch0, ch1)
    }

    fn handle_command(&mut self, line: String) {
        trace!(command = %line, "sim received");
        // The firmware shell echoes every command before its response.
        self.push_text(&line);
        self.push_text("\r\n");
        self.received.push(line.clone());

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("version") => {
                let version = self.config.version.clone();
                self.push_text(&version);
                self.push_text("\r\n");
            }
            Some("sweep") => {
                self.apply_range(&mut parts);
            }
            Some("scan") => {
                let masked = self.apply_range(&mut parts);
                if masked {
                    self.emit_masked_scan();
                }
            }
            Some("pause") => self.paused = true,
            Some("resume") => self.paused = false,
            Some("frequencies") => {
                for hz in self.sweep.frequencies() {
                    let line = format!("{hz}\r\n");
                    self.push_text(&line);
                }
            }
            Some("data") => {
                let channel = parts.next().unwrap_or("0");
                for i in 0..self.sweep.datapoints {
                    let (ch0, ch1) = self.point_tokens(i);
                    let value = if channel == "1" { ch1 } else { ch0 };
                    self.push_text(&value);
                    self.push_text("\r\n");
                }
            }
            Some("capture") => self.emit_capture(),
            Some(_) | None => {
                self.push_text("?\r\n");
            }
        }
        self.push_text("ch> ");
    }

    /// Parse `<start> <stop> <points>` and update the sweep; returns true
    /// when a fourth (mask) argument is present
    fn apply_range<'a>(&mut self, parts: &mut impl Iterator<Item = &'a str>) -> bool {
        let start = parts.next().and_then(|s| s.parse().ok());
        let stop = parts.next().and_then(|s| s.parse().ok());
        let points = parts.next().and_then(|s| s.parse().ok());
        if let (Some(start), Some(stop), Some(points)) = (start, stop, points) {
            if let Ok(range) = SweepRange::new(start, stop, points) {
                self.sweep = range;
            }
        }
        parts.next().is_some()
    }

    fn emit_masked_scan(&mut self) {
        let malformed_at = match self.fault.take() {
            Some(Fault::MalformedScanLine(index)) => Some(index as u32),
            other => {
                self.fault = other;
                None
            }
        };
        for i in 0..self.sweep.datapoints {
            if malformed_at == Some(i) {
                self.push_text("0.1 0.2 0.3\r\n");
                continue;
            }
            let (ch0, ch1) = self.point_tokens(i);
            let line = format!("{ch0} {ch1}\r\n");
            self.push_text(&line);
        }
    }

    fn emit_capture(&mut self) {
        let full = self.config.board.capture_len();
        let len = match self.fault.take() {
            Some(Fault::ShortCapture(len)) => len.min(full),
            other => {
                self.fault = other;
                full
            }
        };
        let [hi, lo] = self.config.fill_pixel.to_be_bytes();
        for _ in 0..len / 2 {
            self.pending.push_back(hi);
            self.pending.push_back(lo);
        }
        if len % 2 == 1 {
            self.pending.push_back(hi);
        }
    }
}

impl Interface for SimVna {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        for &byte in data {
            if byte == b'\r' {
                let line = String::from_utf8_lossy(&self.input).into_owned();
                self.input.clear();
                self.handle_command(line);
            } else {
                self.input.push(byte);
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        if matches!(self.fault, Some(Fault::Mute)) {
            return Err(Error::Timeout);
        }
        let mut buf = Vec::new();
        while let Some(byte) = self.pending.pop_front() {
            if byte == b'\n' {
                break;
            }
            buf.push(byte);
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
        if matches!(self.fault, Some(Fault::Mute)) {
            return Err(Error::Timeout);
        }
        let take = len.min(self.pending.len());
        Ok(self.pending.drain(..take).collect())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }
}
