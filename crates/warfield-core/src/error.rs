//! Error types shared across the warfield crates.
//!
//! Organised by the layer that raises them: cell construction, actor
//! submission, hub registration and inbound decoding.

use std::error::Error;
use std::fmt;

/// A cell value outside the permitted range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellValueError {
    /// The value exceeds the ceiling in force.
    OutOfRange {
        /// The rejected value.
        value: u8,
        /// The largest value that would have been accepted.
        max: u8,
    },
}

impl fmt::Display for CellValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { value, max } => {
                write!(f, "cell value {value} out of range 0..={max}")
            }
        }
    }
}

impl Error for CellValueError {}

/// Failure to hand an event or command to an actor loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The loop has exited; nothing will ever process the message.
    Shutdown,
    /// The intake queue is full (non-blocking submission only).
    ChannelFull,
    /// No reply arrived within the caller's deadline.
    Timeout,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "actor has shut down"),
            Self::ChannelFull => write!(f, "actor intake queue is full"),
            Self::Timeout => write!(f, "timed out waiting for a reply"),
        }
    }
}

impl Error for SubmitError {}

/// Registration of a connection with the hub was refused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// The hub already holds its configured maximum of connections.
    AtCapacity {
        /// The configured maximum.
        max: usize,
    },
    /// The hub (or the world it logs into) has shut down.
    Shutdown,
    /// The world refused the automatic login.
    LoginFailed,
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtCapacity { max } => write!(f, "connection limit of {max} reached"),
            Self::Shutdown => write!(f, "hub has shut down"),
            Self::LoginFailed => write!(f, "world refused login"),
        }
    }
}

impl Error for RegisterError {}

impl From<SubmitError> for RegisterError {
    fn from(_: SubmitError) -> Self {
        Self::Shutdown
    }
}

/// A malformed or unrecognised inbound frame.
///
/// Always handled locally: the frame is logged and discarded, the
/// connection stays open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame carried no payload.
    Empty,
    /// The payload is not valid JSON (or not the expected shape).
    InvalidJson(String),
    /// The `Type` field names no known message kind.
    UnknownKind(String),
    /// The kind is known but its body does not fit it.
    BadBody {
        /// Message kind as received.
        kind: String,
        /// What was wrong with the body.
        reason: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::InvalidJson(reason) => write!(f, "invalid json: {reason}"),
            Self::UnknownKind(kind) => write!(f, "unknown message kind '{kind}'"),
            Self::BadBody { kind, reason } => write!(f, "bad body for '{kind}': {reason}"),
        }
    }
}

impl Error for DecodeError {}
