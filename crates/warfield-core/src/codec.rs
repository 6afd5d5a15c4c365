//! The boundary between typed messages and transport frames.
//!
//! The engine never parses or formats wire text itself; a [`Codec`] does
//! both. Frames are shared, immutable strings so one encoded snapshot can
//! be queued on every connection without copying.

use std::sync::Arc;

use crate::error::DecodeError;
use crate::event::Inbound;
use crate::snapshot::WorldSnapshot;

/// One encoded outbound message.
pub type Frame = Arc<str>;

/// Decodes client frames and encodes server frames.
///
/// Implementations must be stateless (`&self`) so one instance can serve
/// every connection thread.
pub trait Codec: Send + Sync + 'static {
    /// Decode one inbound frame into one or more messages.
    ///
    /// Any malformed input yields an error; the caller logs and drops it.
    fn decode(&self, frame: &str) -> Result<Vec<Inbound>, DecodeError>;

    /// Encode a world snapshot. May produce several frames (e.g. one for
    /// the grid and one for the entity table).
    fn encode_snapshot(&self, snapshot: &WorldSnapshot) -> Vec<Frame>;

    /// Encode one chat line.
    fn encode_chat(&self, line: &str) -> Frame;

    /// Encode a server notice (joins, departures).
    fn encode_notice(&self, text: &str) -> Frame;

    /// Encode the periodic liveness ping.
    fn encode_ping(&self) -> Frame;
}
