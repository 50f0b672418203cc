//! Transport events delivered to a session.

use crate::ids::StreamId;
use bytes::Bytes;

/// One transport-level event for a single session.
///
/// The transport adapter produces these in per-stream arrival order; the
/// session driver consumes them one at a time, so handler state never needs
/// a lock. There is no ordering between streams.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Bytes arrived on a data stream. `ended` marks the final chunk.
    StreamData {
        stream: StreamId,
        data: Bytes,
        ended: bool,
    },
    /// A data stream was abnormally reset by the peer.
    StreamReset { stream: StreamId },
    /// Bytes arrived on the session's own control stream. Application-level
    /// close signals travel here, not on data streams.
    ControlData { data: Bytes, ended: bool },
    /// The underlying connection is gone.
    Closed,
}
