//! Error types for driver operations
//!
//! Three failure classes matter to callers: the device is not connected at
//! all, the serial exchange itself failed (I/O error or timeout), or the
//! device answered with something that does not match the protocol's
//! framing. All driver operations propagate all three; the one exception
//! is the screenshot entry point, which degrades to an empty frame (see
//! [`crate::driver::NanoVna::screenshot`]).

use thiserror::Error;

/// The error type for all driver operations
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was attempted while the device is not connected
    #[error("device not connected")]
    NotConnected,

    /// An underlying serial I/O failure
    #[error("communication error: {0}")]
    Communication(#[from] std::io::Error),

    /// Timed out waiting for the device with nothing received
    #[error("timeout waiting for response")]
    Timeout,

    /// A response did not match expected framing
    #[error("protocol error: {0}")]
    Protocol(#[from] vna_protocol::ParseError),

    /// The interface lock was poisoned by a panic in another thread
    #[error("interface lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// True for failures of the serial exchange itself, as opposed to a
    /// well-received but malformed response
    pub fn is_communication(&self) -> bool {
        matches!(
            self,
            Error::NotConnected | Error::Communication(_) | Error::Timeout
        )
    }
}

/// A convenience `Result` alias using [`Error`] as the error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(Error::NotConnected.to_string(), "device not connected");
        assert_eq!(Error::Timeout.to_string(), "timeout waiting for response");
        let e = Error::Protocol(vna_protocol::ParseError::ShortPayload {
            expected: 10,
            actual: 2,
        });
        assert!(e.to_string().starts_with("protocol error:"));
    }

    #[test]
    fn communication_classification() {
        assert!(Error::Timeout.is_communication());
        assert!(Error::NotConnected.is_communication());
        assert!(Error::Communication(std::io::Error::other("x")).is_communication());
        let proto = Error::Protocol(vna_protocol::ParseError::MalformedDataLine {
            tokens: 3,
            line: "1 2 3".into(),
        });
        assert!(!proto.is_communication());
    }
}
