//! Outbound delivery handle for a session.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

/// Queue of payloads awaiting delivery to one session's peer.
pub type SinkReceiver = mpsc::UnboundedReceiver<Bytes>;

/// Cloneable handle used to queue complete payloads for one session.
///
/// Each queued payload becomes exactly one fresh outbound unidirectional
/// stream: the transport-side writer drains the queue, opens a stream per
/// payload, writes all of it, and finishes the stream. Sends never block,
/// so broadcast fan-out cannot suspend or re-enter handler code.
#[derive(Debug, Clone)]
pub struct StreamSink {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl StreamSink {
    /// Create a sink together with the receiver the writer drains.
    #[must_use]
    pub fn channel() -> (Self, SinkReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue one complete payload for delivery on its own stream.
    ///
    /// Returns `false` if the writer side is gone (session tearing down);
    /// the payload is dropped in that case.
    pub fn send(&self, payload: Bytes) -> bool {
        match self.tx.send(payload) {
            Ok(()) => true,
            Err(_) => {
                trace!("Sink closed, payload dropped");
                false
            }
        }
    }

    /// Whether the writer side has hung up.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
