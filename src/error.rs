//! Error types
//!
//! Nothing here is ever reported to clients: the wire protocol has no error
//! channel. These errors are logged and the offending frame is dropped.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Socket or process I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket transport failed
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// An inbound frame could not be turned into a command
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors decoding client frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Text frame was not a JSON envelope
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Binary frames carry no events
    #[error("Binary frames are not supported")]
    BinaryFrame,

    /// Event name is not in the catalog
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
}

/// Errors applying a clock command
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// `clock:set` value was neither `MM:SS` text nor a number of seconds
    #[error("Invalid clock value: {0}")]
    InvalidValue(String),
}
