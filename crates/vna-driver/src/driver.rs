//! NanoVNA session driver
//!
//! A [`NanoVna`] owns one connected device for the lifetime of a session.
//! At connect time it reads the firmware version once and fixes the sweep
//! protocol variant from it; everything afterwards goes through that
//! variant. The interface sits behind a mutex so that multi-step
//! exchanges, above all the binary screen capture, hold the stream
//! exclusively from first byte to last.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, warn};
use vna_protocol::sweep::parse_masked_line;
use vna_protocol::{
    decode_rgb565, models, BoardModel, ChannelSample, Command, DataChannel, Feature, ParseError,
    PixelFrame, SweepMethod, SweepRange, Version,
};

use crate::error::{Error, Result};
use crate::exec::ResponseLines;
use crate::interface::Interface;

/// Read timeout while the fixed-size capture payload is in flight
///
/// 153600 bytes at 115200 baud take well over a second; four seconds
/// covers it with margin.
pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(4);

/// Sweep range applied until the caller picks one
const DEFAULT_SWEEP_START: u64 = 27_000_000;
const DEFAULT_SWEEP_STOP: u64 = 30_000_000;

/// Read access to a sweep's frequency axis
///
/// The default protocol path asks the device (`frequencies` command);
/// firmware on the masked-scan path never reports frequencies, so the
/// driver derives them locally instead.
pub trait FrequencyReader {
    /// The frequency in Hz for each data index of the current sweep
    fn read_frequencies(&mut self) -> Result<Vec<u64>>;
}

/// Read access to per-channel measurement values
pub trait ValueReader {
    /// The raw value text for each data index of the given channel
    fn read_values(&mut self, channel: DataChannel) -> Result<Vec<String>>;
}

/// Driver session for a NanoVNA-family board
pub struct NanoVna<I: Interface> {
    iface: Arc<Mutex<I>>,
    board: BoardModel,
    version: Version,
    sweep_method: SweepMethod,
    features: Vec<Feature>,
    sweep: SweepRange,
    /// Multiplexed channel cache, overwritten by each channel-0 read.
    /// Channel-1 reads consume whatever is here, even stale data from a
    /// previous sweep cycle; that call-order contract is part of the
    /// observable behavior and deliberately not "fixed".
    sweep_data: Vec<ChannelSample>,
}

impl<I: Interface> NanoVna<I> {
    /// Connect to a classic NanoVNA board
    ///
    /// Reads the firmware version and negotiates the sweep protocol
    /// variant; both are fixed for the session afterwards.
    pub fn connect(iface: I) -> Result<Self> {
        Self::connect_board(iface, models::NANOVNA)
    }

    /// Connect with an explicit board model (screen geometry, datapoints)
    pub fn connect_board(iface: I, board: BoardModel) -> Result<Self> {
        let sweep = SweepRange::new(
            DEFAULT_SWEEP_START,
            DEFAULT_SWEEP_STOP,
            board.default_datapoints,
        )?;
        let mut driver = Self {
            iface: Arc::new(Mutex::new(iface)),
            board,
            version: Version::new(0, 0, 0),
            sweep_method: SweepMethod::Sweep,
            features: Vec::new(),
            sweep,
            sweep_data: Vec::new(),
        };
        driver.version = driver.read_version()?;
        driver.negotiate_features();
        Ok(driver)
    }

    /// Query the device for its firmware version
    pub fn read_version(&self) -> Result<Version> {
        let mut lines = self.exec(&Command::Version)?;
        let first = match lines.next() {
            Some(line) => line?,
            None => return Err(Error::Timeout),
        };
        // Consume the rest of the response so the stream ends at the
        // prompt; some firmware prints build info on extra lines.
        for extra in &mut lines {
            extra?;
        }
        Ok(first.parse::<Version>()?)
    }

    /// Re-run feature negotiation against a freshly read version
    pub fn renegotiate(&mut self) -> Result<()> {
        self.version = self.read_version()?;
        self.negotiate_features();
        Ok(())
    }

    fn negotiate_features(&mut self) {
        self.sweep_method = SweepMethod::for_version(self.version);
        self.features.clear();
        self.features.push(Feature::Screenshots);
        if let Some(feature) = self.sweep_method.feature() {
            self.features.push(feature);
        }
        debug!(
            version = %self.version,
            method = self.sweep_method.name(),
            "features negotiated"
        );
    }

    /// Firmware version read at connect time
    pub fn version(&self) -> Version {
        self.version
    }

    /// The session's sweep protocol variant
    pub fn sweep_method(&self) -> SweepMethod {
        self.sweep_method
    }

    /// Features the firmware version enables
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// The board model this session was opened for
    pub fn board(&self) -> BoardModel {
        self.board
    }

    /// The currently configured sweep range
    pub fn sweep(&self) -> SweepRange {
        self.sweep
    }

    /// Shared handle to the underlying interface
    pub fn interface(&self) -> Arc<Mutex<I>> {
        Arc::clone(&self.iface)
    }

    /// Whether the underlying interface reports a live connection
    pub fn is_connected(&self) -> bool {
        self.lock().map(|g| g.is_connected()).unwrap_or(false)
    }

    /// Change the number of datapoints for subsequent sweeps
    pub fn set_datapoints(&mut self, datapoints: u32) -> Result<()> {
        if !self.board.valid_datapoints.contains(&datapoints) {
            warn!(
                datapoints,
                board = self.board.name,
                "datapoint count not in the board's published set"
            );
        }
        self.sweep = SweepRange::new(self.sweep.start, self.sweep.stop, datapoints)?;
        Ok(())
    }

    /// Configure the sweep range on the device
    ///
    /// Under the masked-scan variant no command goes out here: the scan
    /// runs lazily when channel data is requested.
    pub fn set_sweep(&mut self, start: u64, stop: u64) -> Result<()> {
        self.sweep = SweepRange::new(start, stop, self.sweep.datapoints)?;
        match self.sweep_method {
            SweepMethod::Sweep => self.run(&Command::Sweep(self.sweep)),
            SweepMethod::Scan => self.run(&Command::Scan(self.sweep)),
            SweepMethod::ScanMask => Ok(()),
        }
    }

    /// Hard-reset the sweep via the firmware's legacy path
    ///
    /// Always `sweep` followed by `resume`, regardless of the negotiated
    /// variant; this bypasses method-specific framing and does not touch
    /// the stored range.
    pub fn reset_sweep(&mut self, start: u64, stop: u64) -> Result<()> {
        let range = SweepRange::new(start, stop, self.sweep.datapoints)?;
        self.run(&Command::Sweep(range))?;
        self.run(&Command::Resume)
    }

    /// Halt sweeping
    pub fn pause(&self) -> Result<()> {
        self.run(&Command::Pause)
    }

    /// Resume sweeping
    pub fn resume(&self) -> Result<()> {
        self.run(&Command::Resume)
    }

    /// Raw screen capture exchange; propagates every failure
    ///
    /// Holds the interface lock for the whole multi-step exchange: the
    /// payload is not line-delimited, so any interleaved command would
    /// desynchronize framing on both sides.
    pub fn capture_data(&self) -> Result<Vec<u8>> {
        let expected = self.board.capture_len();
        let mut guard = self.lock()?;
        if !guard.is_connected() {
            return Err(Error::NotConnected);
        }
        guard.drain()?;
        let saved = guard.timeout();
        guard.write(&Command::Capture.encode())?;
        // One echoed acknowledgment line precedes the binary payload.
        guard.read_line()?;
        guard.set_timeout(CAPTURE_TIMEOUT)?;
        let payload = guard.read(expected);
        // Restore the session timeout before surfacing any read failure.
        guard.set_timeout(saved)?;
        let payload = payload?;
        debug!(bytes = payload.len(), "capture payload read");
        Ok(payload)
    }

    /// Capture and decode one screen frame; propagates every failure
    pub fn capture_frame(&self) -> Result<PixelFrame> {
        let payload = self.capture_data()?;
        let frame = decode_rgb565(&payload, self.board.screen_width, self.board.screen_height)?;
        Ok(frame)
    }

    /// Screenshot entry point: degrades to an empty frame on failure
    ///
    /// A failed screenshot is not critical to device operation, so this
    /// is the one place communication failures are caught and logged
    /// instead of propagated. A timed-out transfer surfaces as a short
    /// payload and degrades here as well.
    pub fn screenshot(&self) -> PixelFrame {
        debug!("capturing screenshot");
        match self.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "screenshot capture failed");
                PixelFrame::empty()
            }
        }
    }

    /// Issue a command and drain its response to the prompt
    fn run(&self, command: &Command) -> Result<()> {
        for line in self.exec(command)? {
            line?;
        }
        Ok(())
    }

    /// Issue a command and return its lazy response stream
    fn exec(&self, command: &Command) -> Result<ResponseLines<'_, I>> {
        let guard = self.lock()?;
        if !guard.is_connected() {
            return Err(Error::NotConnected);
        }
        ResponseLines::execute(guard, command)
    }

    fn lock(&self) -> Result<MutexGuard<'_, I>> {
        self.iface.lock().map_err(|_| Error::LockPoisoned)
    }

    /// Default-path frequency read: ask the device to list the axis
    fn base_read_frequencies(&self) -> Result<Vec<u64>> {
        let mut frequencies = Vec::new();
        for line in self.exec(&Command::Frequencies)? {
            let line = line?;
            let hz = line
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidFrequency(line.clone()))?;
            frequencies.push(hz);
        }
        Ok(frequencies)
    }

    /// Default-path value read: `data <n>` returns one line per point
    fn base_read_values(&self, channel: DataChannel) -> Result<Vec<String>> {
        self.exec(&Command::Data(channel))?.collect()
    }

    /// Run one masked scan and parse every response line into a pair
    ///
    /// Built into a fresh buffer so that a malformed line or an I/O
    /// failure leaves the existing cache untouched.
    fn run_masked_scan(&self) -> Result<Vec<ChannelSample>> {
        let expected = self.sweep.datapoints as usize;
        let mut samples = Vec::with_capacity(expected);
        for line in self.exec(&Command::ScanMasked(self.sweep))? {
            samples.push(parse_masked_line(&line?)?);
        }
        if samples.len() != expected {
            warn!(
                expected,
                actual = samples.len(),
                "masked scan returned unexpected line count"
            );
        }
        Ok(samples)
    }
}

impl<I: Interface> FrequencyReader for NanoVna<I> {
    fn read_frequencies(&mut self) -> Result<Vec<u64>> {
        if self.sweep_method == SweepMethod::ScanMask {
            // This firmware never reports frequencies; derive the axis
            // locally to match the device's index mapping.
            return Ok(self.sweep.frequencies());
        }
        self.base_read_frequencies()
    }
}

impl<I: Interface> ValueReader for NanoVna<I> {
    fn read_values(&mut self, channel: DataChannel) -> Result<Vec<String>> {
        if self.sweep_method != SweepMethod::ScanMask {
            return self.base_read_values(channel);
        }
        debug!(channel = channel.index(), "read_values via scan mask");
        // The hardware returns both channels in one query; grab the data
        // only when channel 0 is requested and serve channel 1 from the
        // cache.
        if channel == DataChannel::Channel0 {
            self.sweep_data = self.run_masked_scan()?;
        }
        Ok(self
            .sweep_data
            .iter()
            .map(|sample| match channel {
                DataChannel::Channel0 => sample.ch0.clone(),
                DataChannel::Channel1 => sample.ch1.clone(),
            })
            .collect())
    }
}
