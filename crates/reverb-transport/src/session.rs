//! Session plumbing: inbound event pump and outbound stream writer.
//!
//! One pump task and one writer task run per accepted connection. The pump
//! turns connection activity into [`SessionEvent`] values; the writer
//! drains the session's sink queue, one fresh unidirectional stream per
//! payload.

use crate::error::TransportError;
use bytes::Bytes;
use mozue_reverb_core::{ConnectionId, SessionEvent, SinkReceiver, StreamId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use wtransport::{Connection, RecvStream};

/// Read size for inbound stream chunks.
const READ_CHUNK: usize = 64 * 1024;

/// Feed one connection's activity into the session event queue.
///
/// Each inbound stream gets its own reader task, so a stalled stream never
/// blocks the others; per-stream chunk order is preserved by the reader
/// itself. Datagrams are drained and dropped since no component consumes
/// them. Returns once the connection is gone and `Closed` was queued.
pub async fn pump_session(
    connection: Connection,
    id: ConnectionId,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    let mut next_stream = 0u64;
    loop {
        tokio::select! {
            uni = connection.accept_uni() => match uni {
                Ok(stream) => {
                    let stream_id = StreamId::from(next_stream);
                    next_stream += 1;
                    spawn_stream_reader(stream, stream_id, events.clone());
                }
                Err(error) => {
                    debug!(connection = %id, reason = %error, "Connection gone");
                    break;
                }
            },
            bi = connection.accept_bi() => match bi {
                Ok((_send, recv)) => {
                    // No reply ever goes out on the inbound stream itself;
                    // the send half is dropped unused.
                    let stream_id = StreamId::from(next_stream);
                    next_stream += 1;
                    spawn_stream_reader(recv, stream_id, events.clone());
                }
                Err(error) => {
                    debug!(connection = %id, reason = %error, "Connection gone");
                    break;
                }
            },
            datagram = connection.receive_datagram() => match datagram {
                Ok(datagram) => {
                    trace!(connection = %id, bytes = datagram.len(), "Datagram dropped");
                }
                Err(error) => {
                    debug!(connection = %id, reason = %error, "Connection gone");
                    break;
                }
            },
        }
    }
    let _ = events.send(SessionEvent::Closed);
}

fn spawn_stream_reader(
    mut stream: RecvStream,
    id: StreamId,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK];
        loop {
            match stream.read(&mut buf).await {
                Ok(Some(read)) => {
                    let event = SessionEvent::StreamData {
                        stream: id,
                        data: Bytes::copy_from_slice(&buf[..read]),
                        ended: false,
                    };
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => {
                    let _ = events.send(SessionEvent::StreamData {
                        stream: id,
                        data: Bytes::new(),
                        ended: true,
                    });
                    return;
                }
                Err(error) => {
                    trace!(stream = %id, reason = %error, "Inbound stream reset");
                    let _ = events.send(SessionEvent::StreamReset { stream: id });
                    return;
                }
            }
        }
    });
}

/// Drain a session's outbound queue, one fresh unidirectional stream per
/// payload.
///
/// Opening, writing the whole payload, then finishing keeps delivery
/// all-or-nothing: a peer observes either the complete payload or a stream
/// it can discard. A failed delivery is logged and the next payload is
/// attempted; the task exits once every sink handle for the session has
/// been dropped.
pub fn spawn_uni_writer(
    connection: Connection,
    id: ConnectionId,
    mut queue: SinkReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(payload) = queue.recv().await {
            if let Err(error) = write_payload(&connection, &payload).await {
                debug!(
                    connection = %id,
                    bytes = payload.len(),
                    reason = %error,
                    "Outbound delivery failed"
                );
            }
        }
        trace!(connection = %id, "Writer drained");
    })
}

async fn write_payload(connection: &Connection, payload: &[u8]) -> Result<(), TransportError> {
    let mut stream = connection.open_uni().await?.await?;
    stream.write_all(payload).await?;
    stream.finish().await?;
    Ok(())
}
