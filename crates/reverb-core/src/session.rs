//! Session state: the owned handler slot and event dispatch.

use crate::events::SessionEvent;
use crate::handler::Handler;
use crate::ids::ConnectionId;
use reverb_protocol::signal::is_close_signal;
use thiserror::Error;
use tracing::{debug, trace};

/// Session-level contract violations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A handler was already bound to this session.
    #[error("handler already bound for {0}")]
    AlreadyBound(ConnectionId),
}

/// One accepted session: a connection identity plus the single handler
/// driving it.
///
/// The handler slot is set exactly once, right after routing. Binding twice
/// indicates a routing bug and surfaces as [`SessionError::AlreadyBound`]
/// rather than silently replacing the handler.
#[derive(Debug)]
pub struct Session {
    connection: ConnectionId,
    handler: Option<Handler>,
    closed: bool,
}

impl Session {
    /// Create a session with an empty handler slot.
    #[must_use]
    pub fn new(connection: ConnectionId) -> Self {
        Self {
            connection,
            handler: None,
            closed: false,
        }
    }

    /// The connection identity of this session.
    #[must_use]
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Bind the session's handler.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyBound`] if a handler is already set.
    pub fn bind(&mut self, handler: Handler) -> Result<(), SessionError> {
        if self.handler.is_some() {
            return Err(SessionError::AlreadyBound(self.connection));
        }
        debug!(
            connection = %self.connection,
            role = handler.role().as_str(),
            "Handler bound"
        );
        self.handler = Some(handler);
        Ok(())
    }

    /// Whether the session has been torn down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Dispatch one transport event.
    ///
    /// Returns `true` once the session is over (close signal on the control
    /// stream, or connection teardown); the caller stops feeding events.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        if self.closed {
            return true;
        }
        match event {
            SessionEvent::StreamData {
                stream,
                data,
                ended,
            } => {
                match self.handler.as_mut() {
                    Some(handler) => handler.on_stream_data(stream, &data, ended),
                    None => {
                        trace!(
                            connection = %self.connection,
                            stream = %stream,
                            "Data before a handler was bound, dropped"
                        );
                    }
                }
                false
            }
            SessionEvent::StreamReset { stream } => {
                if let Some(handler) = self.handler.as_mut() {
                    handler.on_stream_reset(stream);
                }
                false
            }
            SessionEvent::ControlData { data, ended } => {
                if is_close_signal(&data, ended) {
                    debug!(connection = %self.connection, "Close signal on control stream");
                    self.close();
                    true
                } else {
                    trace!(
                        connection = %self.connection,
                        bytes = data.len(),
                        ended,
                        "Unrecognized control data"
                    );
                    false
                }
            }
            SessionEvent::Closed => {
                self.close();
                true
            }
        }
    }

    /// Tear the session down, exactly once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(handler) = self.handler.as_mut() {
            handler.on_session_closed();
        }
        debug!(connection = %self.connection, "Session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::{Hub, MediaKind};
    use crate::ids::StreamId;
    use crate::route::Role;
    use crate::sink::StreamSink;
    use bytes::Bytes;
    use std::sync::Arc;

    fn bound_session(hub: &Arc<Hub>, role: Role) -> Session {
        let connection = ConnectionId::next();
        let (sink, _rx) = StreamSink::channel();
        let mut session = Session::new(connection);
        session
            .bind(Handler::build(role, Arc::clone(hub), connection, sink))
            .unwrap();
        session
    }

    #[test]
    fn test_bind_twice_is_an_error() {
        let hub = Arc::new(Hub::new());
        let connection = ConnectionId::from(1);
        let (sink_a, _rx_a) = StreamSink::channel();
        let (sink_b, _rx_b) = StreamSink::channel();

        let mut session = Session::new(connection);
        session
            .bind(Handler::build(
                Role::Chat,
                Arc::clone(&hub),
                connection,
                sink_a,
            ))
            .unwrap();

        let result = session.bind(Handler::build(
            Role::Chat,
            Arc::clone(&hub),
            connection,
            sink_b,
        ));
        assert!(matches!(
            result,
            Err(SessionError::AlreadyBound(c)) if c == connection
        ));
    }

    #[test]
    fn test_close_signal_terminates_session() {
        let hub = Arc::new(Hub::new());
        let mut session = bound_session(&hub, Role::Viewer(MediaKind::Audio));
        let connection = session.connection();
        assert!(hub.media(MediaKind::Audio).contains(connection));

        let terminal = session.handle_event(SessionEvent::ControlData {
            data: Bytes::from_static(&[0x68, 0x43, 0x00]),
            ended: true,
        });

        assert!(terminal);
        assert!(session.is_closed());
        assert!(!hub.media(MediaKind::Audio).contains(connection));
    }

    #[test]
    fn test_non_signal_control_data_is_ignored() {
        let hub = Arc::new(Hub::new());
        let mut session = bound_session(&hub, Role::Chat);

        // Marker present but the stream has not ended.
        assert!(!session.handle_event(SessionEvent::ControlData {
            data: Bytes::from_static(&[0x68, 0x43, 0x00]),
            ended: false,
        }));
        // Ended but no marker.
        assert!(!session.handle_event(SessionEvent::ControlData {
            data: Bytes::from_static(b"ping"),
            ended: true,
        }));
        assert!(!session.is_closed());
    }

    #[test]
    fn test_connection_teardown_closes_once() {
        let hub = Arc::new(Hub::new());
        let mut session = bound_session(&hub, Role::Viewer(MediaKind::Video));
        let connection = session.connection();

        assert!(session.handle_event(SessionEvent::Closed));
        assert!(session.handle_event(SessionEvent::Closed));
        assert!(!hub.media(MediaKind::Video).contains(connection));
    }

    #[test]
    fn test_data_before_bind_is_dropped() {
        let mut session = Session::new(ConnectionId::from(900));
        let terminal = session.handle_event(SessionEvent::StreamData {
            stream: StreamId::from(0),
            data: Bytes::from_static(b"early"),
            ended: true,
        });
        assert!(!terminal);
    }

    #[test]
    fn test_stream_events_reach_the_handler() {
        let hub = Arc::new(Hub::new());
        let (viewer_sink, mut viewer_rx) = StreamSink::channel();
        hub.media(MediaKind::Audio)
            .subscribe(ConnectionId::from(950), viewer_sink);

        let mut session = bound_session(&hub, Role::Publisher(MediaKind::Audio));
        session.handle_event(SessionEvent::StreamData {
            stream: StreamId::from(4),
            data: Bytes::from_static(b"frame-bytes-frame-bytes"),
            ended: true,
        });

        assert_eq!(
            viewer_rx.try_recv().unwrap(),
            Bytes::from_static(b"frame-bytes-frame-bytes")
        );
    }
}
