//! Command execution: one-shot lazy response line streams
//!
//! Sending a command and reading its reply is a single exclusive exchange
//! on the serial stream. [`ResponseLines`] holds the session lock for its
//! whole lifetime, reads lines lazily, suppresses the device's echo of the
//! command, and terminates at the `ch>` prompt. It is finite and
//! single-pass: the underlying stream is consumed as the iterator
//! advances, so a stream cannot be restarted and a new command must not be
//! issued while one is still being drained (the lock enforces this).

use std::sync::MutexGuard;

use tracing::{debug, trace};
use vna_protocol::Command;

use crate::error::Result;
use crate::interface::Interface;

/// The firmware shell prompt that terminates every response
const PROMPT: &str = "ch>";

/// Lazy iterator over one command's response lines
///
/// Yields `Result<String>` per non-empty line until the prompt is seen.
/// An I/O failure yields one `Err` and then ends the stream.
pub struct ResponseLines<'a, I: Interface> {
    guard: MutexGuard<'a, I>,
    /// Echoed command text still expected from the device, if any
    echo: Option<String>,
    done: bool,
}

impl<'a, I: Interface> ResponseLines<'a, I> {
    /// Drain stale input, send `command`, and return the response stream
    ///
    /// The caller supplies the already-acquired session lock; it travels
    /// into the returned iterator and is released when that is dropped.
    pub(crate) fn execute(mut guard: MutexGuard<'a, I>, command: &Command) -> Result<Self> {
        let text = command.to_string();
        debug!(command = %text, "exec");
        guard.drain()?;
        guard.write(&command.encode())?;
        Ok(Self {
            guard,
            echo: Some(text),
            done: false,
        })
    }
}

impl<I: Interface> Iterator for ResponseLines<'_, I> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.guard.read_line() {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if self.echo.as_deref() == Some(line) {
                trace!(line, "echo suppressed");
                self.echo = None;
                continue;
            }
            if line.starts_with(PROMPT) {
                self.done = true;
                return None;
            }
            return Some(Ok(line.to_string()));
        }
    }
}
