//! Error types
//!
//! A single error enum covers every fallible operation in the crate. The hub
//! itself never fails; errors only come from transports, codecs and
//! subscription validation.

use std::fmt;
use std::io;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for transport and session operations
#[derive(Debug)]
pub enum Error {
    /// Underlying socket or I/O failure
    Io(io::Error),
    /// A frame could not be encoded or decoded as JSON
    Codec(serde_json::Error),
    /// The peer sent a frame that is not valid at this point of the call
    Protocol(String),
    /// Subscription parameters are out of range
    InvalidSubscription(String),
    /// The server refused to open a subscribe call
    SubscribeRejected(String),
    /// The peer closed the connection before the call completed
    ConnectionClosed,
    /// An operation did not complete within its deadline
    Timeout,
    /// The downstream sink can no longer accept messages
    SinkClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Codec(e) => write!(f, "Codec error: {}", e),
            Error::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            Error::InvalidSubscription(msg) => write!(f, "Invalid subscription: {}", msg),
            Error::SubscribeRejected(msg) => write!(f, "Subscribe rejected: {}", msg),
            Error::ConnectionClosed => write!(f, "Connection closed"),
            Error::Timeout => write!(f, "Operation timed out"),
            Error::SinkClosed => write!(f, "Sink closed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(e)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Error::Timeout
    }
}

impl Error {
    /// Whether this error means the peer went away rather than misbehaved
    pub fn is_disconnect(&self) -> bool {
        match self {
            Error::ConnectionClosed | Error::SinkClosed => true,
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::InvalidSubscription("sample_rate_hz must be >= 0".into());
        assert_eq!(
            err.to_string(),
            "Invalid subscription: sample_rate_hz must be >= 0"
        );
        assert_eq!(Error::SinkClosed.to_string(), "Sink closed");
    }

    #[test]
    fn test_is_disconnect() {
        assert!(Error::ConnectionClosed.is_disconnect());
        assert!(Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)).is_disconnect());
        assert!(!Error::Protocol("bad frame".into()).is_disconnect());
        assert!(!Error::Timeout.is_disconnect());
    }
}
