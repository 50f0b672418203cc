//! Per-session handler variants.
//!
//! Every accepted session is bound to exactly one [`Handler`], selected by
//! the request path. Handlers receive stream-level events from the session
//! driver one at a time and run to completion, so their own state needs no
//! synchronization; shared state lives in the [`Hub`].

use crate::hub::{ChatMember, Hub, MediaKind};
use crate::ids::{ConnectionId, StreamId};
use crate::reassembly::Reassembler;
use crate::route::Role;
use crate::sink::StreamSink;
use reverb_protocol::chat::{parse_command, ChatCommand, ChatError, ChatNotice};
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// The handler bound to one session, dispatched by role.
#[derive(Debug)]
pub enum Handler {
    /// `/chat` participant.
    Chat(ChatSession),
    /// Media ingest on `/audio/stream` or `/video/stream`.
    Publisher(MediaPublisher),
    /// Media subscriber on `/audio/view` or `/video/view`.
    Viewer(MediaViewer),
}

impl Handler {
    /// Construct the handler for `role`.
    ///
    /// Viewers join their channel here, so their subscription exists from
    /// the session's first moment.
    #[must_use]
    pub fn build(role: Role, hub: Arc<Hub>, connection: ConnectionId, sink: StreamSink) -> Self {
        match role {
            Role::Chat => Self::Chat(ChatSession::new(hub, connection, sink)),
            Role::Publisher(kind) => Self::Publisher(MediaPublisher::new(hub, kind)),
            Role::Viewer(kind) => Self::Viewer(MediaViewer::new(hub, connection, kind, sink)),
        }
    }

    /// The role this handler was built for.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Chat(_) => Role::Chat,
            Self::Publisher(handler) => Role::Publisher(handler.kind),
            Self::Viewer(handler) => Role::Viewer(handler.kind),
        }
    }

    /// Feed one stream-data event to the handler.
    pub fn on_stream_data(&mut self, stream: StreamId, chunk: &[u8], ended: bool) {
        match self {
            Self::Chat(handler) => handler.on_stream_data(stream, chunk, ended),
            Self::Publisher(handler) => handler.on_stream_data(stream, chunk, ended),
            Self::Viewer(handler) => handler.on_stream_data(stream, chunk, ended),
        }
    }

    /// Feed an abnormal stream reset to the handler.
    pub fn on_stream_reset(&mut self, stream: StreamId) {
        match self {
            Self::Chat(handler) => handler.on_stream_reset(stream),
            Self::Publisher(handler) => handler.on_stream_reset(stream),
            Self::Viewer(handler) => handler.on_stream_reset(stream),
        }
    }

    /// Tear the handler down; the session is over.
    pub fn on_session_closed(&mut self) {
        match self {
            Self::Chat(handler) => handler.on_session_closed(),
            Self::Publisher(handler) => handler.on_session_closed(),
            Self::Viewer(handler) => handler.on_session_closed(),
        }
    }
}

/// Media subscriber: joins its channel at construction, leaves on close.
#[derive(Debug)]
pub struct MediaViewer {
    hub: Arc<Hub>,
    connection: ConnectionId,
    kind: MediaKind,
}

impl MediaViewer {
    fn new(hub: Arc<Hub>, connection: ConnectionId, kind: MediaKind, sink: StreamSink) -> Self {
        hub.media(kind).subscribe(connection, sink);
        Self {
            hub,
            connection,
            kind,
        }
    }

    fn on_stream_data(&mut self, stream: StreamId, chunk: &[u8], ended: bool) {
        // Viewers never send frames.
        trace!(
            stream = %stream,
            bytes = chunk.len(),
            ended,
            "Ignoring data from viewer"
        );
    }

    fn on_stream_reset(&mut self, _stream: StreamId) {}

    fn on_session_closed(&mut self) {
        self.hub.media(self.kind).unsubscribe(self.connection);
    }
}

/// Media ingest: reassembles one frame per stream and fans it out.
#[derive(Debug)]
pub struct MediaPublisher {
    hub: Arc<Hub>,
    kind: MediaKind,
    frames: Reassembler,
}

impl MediaPublisher {
    fn new(hub: Arc<Hub>, kind: MediaKind) -> Self {
        Self {
            hub,
            kind,
            frames: Reassembler::new(),
        }
    }

    fn on_stream_data(&mut self, stream: StreamId, chunk: &[u8], ended: bool) {
        self.frames.append(stream, chunk);
        if ended {
            let frame = self.frames.finish(stream);
            let delivered = self.hub.media(self.kind).broadcast(&frame);
            debug!(
                channel = %self.kind,
                stream = %stream,
                bytes = frame.len(),
                delivered,
                "Relayed frame"
            );
        }
    }

    fn on_stream_reset(&mut self, stream: StreamId) {
        self.frames.release(stream);
    }

    fn on_session_closed(&mut self) {}
}

/// Chat participant: parses completed JSON commands and drives the chat
/// channel. Membership exists only between a successful `enter` and the
/// session's close.
#[derive(Debug)]
pub struct ChatSession {
    hub: Arc<Hub>,
    connection: ConnectionId,
    sink: StreamSink,
    commands: Reassembler,
}

impl ChatSession {
    fn new(hub: Arc<Hub>, connection: ConnectionId, sink: StreamSink) -> Self {
        Self {
            hub,
            connection,
            sink,
            commands: Reassembler::new(),
        }
    }

    fn on_stream_data(&mut self, stream: StreamId, chunk: &[u8], ended: bool) {
        self.commands.append(stream, chunk);
        if ended {
            let raw = self.commands.finish(stream);
            self.handle_command(&raw);
        }
    }

    fn on_stream_reset(&mut self, stream: StreamId) {
        self.commands.release(stream);
    }

    fn on_session_closed(&mut self) {
        match self.hub.chat().unsubscribe(self.connection) {
            Some(member) => {
                self.broadcast(&ChatNotice::left(&member.name));
                info!(
                    connection = %self.connection,
                    name = %member.name,
                    "Chat member left"
                );
            }
            None => {
                debug!(connection = %self.connection, "Chat session closed before enter");
            }
        }
    }

    fn handle_command(&mut self, raw: &[u8]) {
        match parse_command(raw) {
            Ok(ChatCommand::Enter { name }) => self.enter(name),
            Ok(ChatCommand::Comment { comment }) => self.comment(&comment),
            Err(ChatError::UnknownCommand(command)) => {
                warn!(
                    connection = %self.connection,
                    command = %command,
                    "Ignoring unknown chat command"
                );
            }
            Err(ChatError::Malformed(error)) => {
                warn!(
                    connection = %self.connection,
                    error = %error,
                    "Rejecting malformed chat payload"
                );
            }
        }
    }

    fn enter(&mut self, name: String) {
        // The welcome goes to the sender alone, ahead of any broadcast.
        self.send_to_self(&ChatNotice::welcome(&name));

        // Membership is registered before the join notice so the new member
        // receives its own announcement.
        let member = ChatMember::new(name.clone(), self.sink.clone());
        self.hub.chat().subscribe(self.connection, member);
        self.broadcast(&ChatNotice::joined(&name));
        info!(connection = %self.connection, name = %name, "Chat member entered");
    }

    fn comment(&mut self, comment: &str) {
        match self.hub.chat().lookup(self.connection) {
            Some(member) => {
                self.broadcast(&ChatNotice::comment(&member.name, comment));
            }
            None => {
                warn!(connection = %self.connection, "Rejecting comment before enter");
            }
        }
    }

    fn send_to_self(&self, notice: &ChatNotice) {
        match notice.encode() {
            Ok(payload) => {
                self.sink.send(payload);
            }
            Err(error) => {
                warn!(
                    connection = %self.connection,
                    error = %error,
                    "Failed to encode chat notice"
                );
            }
        }
    }

    fn broadcast(&self, notice: &ChatNotice) {
        match notice.encode() {
            Ok(payload) => {
                self.hub.chat().broadcast(&payload);
            }
            Err(error) => {
                warn!(
                    connection = %self.connection,
                    error = %error,
                    "Failed to encode chat notice"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_enter_welcomes_sender_and_announces_join() {
        let hub = Arc::new(Hub::new());

        // An existing member observes the join.
        let (bob_sink, mut bob_rx) = StreamSink::channel();
        hub.chat()
            .subscribe(ConnectionId::from(1), ChatMember::new("Bob", bob_sink));

        let (alice_sink, mut alice_rx) = StreamSink::channel();
        let alice = ConnectionId::from(2);
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), alice, alice_sink);

        handler.on_stream_data(
            StreamId::from(4),
            br#"{"command":"enter","name":"Alice"}"#,
            true,
        );

        // Sender: private welcome first, then its own join notification.
        assert_eq!(
            alice_rx.try_recv().unwrap(),
            Bytes::from_static(
                br#"{"command":"comment","name":"server","comment":"Welcome, Alice"}"#
            )
        );
        assert_eq!(
            alice_rx.try_recv().unwrap(),
            Bytes::from_static(br#"{"name":"server","comment":"Alice joined"}"#)
        );
        assert!(alice_rx.try_recv().is_err());

        // Existing member: join notification only.
        assert_eq!(
            bob_rx.try_recv().unwrap(),
            Bytes::from_static(br#"{"name":"server","comment":"Alice joined"}"#)
        );
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn test_comment_uses_registered_name() {
        let hub = Arc::new(Hub::new());
        let (sink, mut rx) = StreamSink::channel();
        let alice = ConnectionId::from(7);
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), alice, sink);

        handler.on_stream_data(
            StreamId::from(0),
            br#"{"command":"enter","name":"Alice"}"#,
            true,
        );
        handler.on_stream_data(
            StreamId::from(4),
            br#"{"command":"comment","comment":"hello"}"#,
            true,
        );

        // Skip the welcome and the join notification.
        rx.try_recv().unwrap();
        rx.try_recv().unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            Bytes::from_static(br#"{"name":"Alice","comment":"hello"}"#)
        );
    }

    #[test]
    fn test_comment_without_enter_is_rejected() {
        let hub = Arc::new(Hub::new());
        let (observer_sink, mut observer_rx) = StreamSink::channel();
        hub.chat()
            .subscribe(ConnectionId::from(1), ChatMember::new("Bob", observer_sink));

        let (sink, mut rx) = StreamSink::channel();
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), ConnectionId::from(2), sink);

        handler.on_stream_data(
            StreamId::from(0),
            br#"{"command":"comment","comment":"hi"}"#,
            true,
        );

        assert!(observer_rx.try_recv().is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_close_broadcasts_leave_once() {
        let hub = Arc::new(Hub::new());
        let (observer_sink, mut observer_rx) = StreamSink::channel();
        hub.chat()
            .subscribe(ConnectionId::from(1), ChatMember::new("Bob", observer_sink));

        let (sink, _rx) = StreamSink::channel();
        let alice = ConnectionId::from(2);
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), alice, sink);
        handler.on_stream_data(
            StreamId::from(0),
            br#"{"command":"enter","name":"Alice"}"#,
            true,
        );

        // Join seen by the observer.
        observer_rx.try_recv().unwrap();

        handler.on_session_closed();
        assert_eq!(
            observer_rx.try_recv().unwrap(),
            Bytes::from_static(br#"{"name":"server","comment":"Alice left"}"#)
        );
        assert!(hub.chat().lookup(alice).is_none());

        // A second close finds no membership and stays quiet.
        handler.on_session_closed();
        assert!(observer_rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_and_malformed_commands_are_dropped() {
        let hub = Arc::new(Hub::new());
        let (observer_sink, mut observer_rx) = StreamSink::channel();
        hub.chat()
            .subscribe(ConnectionId::from(1), ChatMember::new("Bob", observer_sink));

        let (sink, mut rx) = StreamSink::channel();
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), ConnectionId::from(2), sink);

        handler.on_stream_data(StreamId::from(0), br#"{"command":"shout","name":"X"}"#, true);
        handler.on_stream_data(StreamId::from(4), b"not json", true);

        assert!(observer_rx.try_recv().is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_chat_command_reassembled_across_chunks() {
        let hub = Arc::new(Hub::new());
        let (sink, mut rx) = StreamSink::channel();
        let mut handler = Handler::build(Role::Chat, Arc::clone(&hub), ConnectionId::from(3), sink);

        let payload = br#"{"command":"enter","name":"Ann"}"#;
        let (head, tail) = payload.split_at(10);
        handler.on_stream_data(StreamId::from(8), head, false);
        handler.on_stream_data(StreamId::from(8), tail, true);

        assert_eq!(
            rx.try_recv().unwrap(),
            Bytes::from_static(
                br#"{"command":"comment","name":"server","comment":"Welcome, Ann"}"#
            )
        );
    }

    #[test]
    fn test_publisher_relays_reassembled_frame() {
        let hub = Arc::new(Hub::new());
        let (first_sink, mut first_rx) = StreamSink::channel();
        let (second_sink, mut second_rx) = StreamSink::channel();
        hub.media(MediaKind::Audio)
            .subscribe(ConnectionId::from(1), first_sink);
        hub.media(MediaKind::Audio)
            .subscribe(ConnectionId::from(3), second_sink);

        let (publisher_sink, _publisher_rx) = StreamSink::channel();
        let mut handler = Handler::build(
            Role::Publisher(MediaKind::Audio),
            Arc::clone(&hub),
            ConnectionId::from(2),
            publisher_sink,
        );

        let frame: Vec<u8> = (0..100u8).collect();
        handler.on_stream_data(StreamId::from(0), &frame[..40], false);
        handler.on_stream_data(StreamId::from(0), &frame[40..], true);

        // One delivery per viewer, each carrying the full 100 bytes.
        let expected = Bytes::from(frame);
        assert_eq!(first_rx.try_recv().unwrap(), expected);
        assert_eq!(second_rx.try_recv().unwrap(), expected);
        assert!(first_rx.try_recv().is_err());
        assert!(second_rx.try_recv().is_err());
    }

    #[test]
    fn test_publisher_reset_discards_partial_frame() {
        let hub = Arc::new(Hub::new());
        let (viewer_sink, mut viewer_rx) = StreamSink::channel();
        hub.media(MediaKind::Video)
            .subscribe(ConnectionId::from(1), viewer_sink);

        let (sink, _rx) = StreamSink::channel();
        let mut handler = Handler::build(
            Role::Publisher(MediaKind::Video),
            Arc::clone(&hub),
            ConnectionId::from(2),
            sink,
        );

        handler.on_stream_data(StreamId::from(0), b"partial", false);
        handler.on_stream_reset(StreamId::from(0));
        assert!(viewer_rx.try_recv().is_err());

        // The next stream is unaffected.
        let frame = vec![9u8; 64];
        handler.on_stream_data(StreamId::from(4), &frame, true);
        assert_eq!(viewer_rx.try_recv().unwrap(), Bytes::from(frame));
    }

    #[test]
    fn test_viewer_subscribes_on_build_and_unsubscribes_on_close() {
        let hub = Arc::new(Hub::new());
        let (sink, mut rx) = StreamSink::channel();
        let viewer = ConnectionId::from(5);
        let mut handler = Handler::build(
            Role::Viewer(MediaKind::Audio),
            Arc::clone(&hub),
            viewer,
            sink,
        );

        assert!(hub.media(MediaKind::Audio).contains(viewer));

        // Data from a viewer is ignored.
        handler.on_stream_data(StreamId::from(0), b"unexpected", true);
        assert!(rx.try_recv().is_err());

        handler.on_session_closed();
        assert!(!hub.media(MediaKind::Audio).contains(viewer));
    }

    #[test]
    fn test_handler_reports_its_role() {
        let hub = Arc::new(Hub::new());
        let (sink, _rx) = StreamSink::channel();
        let handler = Handler::build(
            Role::Viewer(MediaKind::Video),
            Arc::clone(&hub),
            ConnectionId::from(1),
            sink,
        );
        assert_eq!(handler.role(), Role::Viewer(MediaKind::Video));
        assert_eq!(handler.role().as_str(), "video-viewer");
    }
}
