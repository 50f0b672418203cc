//! Broadcast channels and the hub that owns them.
//!
//! A channel maps connection identities to subscriber records and fans each
//! complete payload out by queueing it on every record's sink; the
//! transport-side writer turns each queued payload into one fresh
//! unidirectional stream. [`Hub`] owns the three channels (audio, video,
//! chat) shared by every session.

use crate::ids::ConnectionId;
use crate::sink::StreamSink;
use bytes::Bytes;
use dashmap::DashMap;
use reverb_protocol::media::FRAME_HEADER_LEN;
use std::fmt;
use tracing::{debug, warn};

/// Which media channel a publisher or viewer is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Channel name used in diagnostics and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscriber record that exposes the sink deliveries are queued on.
pub trait HasSink {
    /// The outbound sink for this record's session.
    fn sink(&self) -> &StreamSink;
}

impl HasSink for StreamSink {
    fn sink(&self) -> &StreamSink {
        self
    }
}

/// Chat subscriber record: a sink plus the display name registered on enter.
#[derive(Debug, Clone)]
pub struct ChatMember {
    /// Display name given by the `enter` command.
    pub name: String,
    /// Delivery handle for this member's session.
    pub sink: StreamSink,
}

impl ChatMember {
    /// Create a member record.
    #[must_use]
    pub fn new(name: impl Into<String>, sink: StreamSink) -> Self {
        Self {
            name: name.into(),
            sink,
        }
    }
}

impl HasSink for ChatMember {
    fn sink(&self) -> &StreamSink {
        &self.sink
    }
}

/// One broadcast channel: an unordered map of subscriber records keyed by
/// connection identity.
#[derive(Debug)]
pub struct Channel<R> {
    name: &'static str,
    subscribers: DashMap<ConnectionId, R>,
}

impl<R: HasSink> Channel<R> {
    /// Create an empty channel.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: DashMap::new(),
        }
    }

    /// Channel name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert or overwrite the record for a connection.
    pub fn subscribe(&self, connection: ConnectionId, record: R) {
        self.subscribers.insert(connection, record);
        debug!(
            channel = %self.name,
            connection = %connection,
            subscribers = self.subscribers.len(),
            "Subscribed"
        );
    }

    /// Remove and return the record for a connection.
    ///
    /// Removing an absent entry is a no-op returning `None`.
    pub fn unsubscribe(&self, connection: ConnectionId) -> Option<R> {
        let removed = self.subscribers.remove(&connection).map(|(_, record)| record);
        if removed.is_some() {
            debug!(
                channel = %self.name,
                connection = %connection,
                subscribers = self.subscribers.len(),
                "Unsubscribed"
            );
        }
        removed
    }

    /// Current record for a connection, if subscribed.
    #[must_use]
    pub fn lookup(&self, connection: ConnectionId) -> Option<R>
    where
        R: Clone,
    {
        self.subscribers
            .get(&connection)
            .map(|entry| entry.value().clone())
    }

    /// Whether the connection is currently subscribed.
    #[must_use]
    pub fn contains(&self, connection: ConnectionId) -> bool {
        self.subscribers.contains_key(&connection)
    }

    /// Number of current subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether the channel has no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Queue one complete payload to every current subscriber.
    ///
    /// Membership is snapshotted up front, so records added or removed while
    /// the fan-out runs affect later broadcasts only. Each delivery is the
    /// entire payload on a brand-new stream; a subscriber whose session is
    /// tearing down is skipped. Returns the number of deliveries queued.
    pub fn broadcast(&self, payload: &Bytes) -> usize {
        if payload.len() < FRAME_HEADER_LEN {
            warn!(
                channel = %self.name,
                bytes = payload.len(),
                "Broadcast payload shorter than a frame header, relaying anyway"
            );
        }

        let targets: Vec<(ConnectionId, StreamSink)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().sink().clone()))
            .collect();

        let mut delivered = 0;
        for (connection, sink) in targets {
            if sink.send(payload.clone()) {
                delivered += 1;
            } else {
                debug!(
                    channel = %self.name,
                    connection = %connection,
                    "Skipped closed sink during broadcast"
                );
            }
        }
        delivered
    }
}

/// Shared registries for every channel the relay serves.
///
/// One hub is created at startup and handed to every session handler as an
/// `Arc`. The chat channel doubles as the member registry since its records
/// carry the display name.
#[derive(Debug)]
pub struct Hub {
    audio: Channel<StreamSink>,
    video: Channel<StreamSink>,
    chat: Channel<ChatMember>,
}

impl Hub {
    /// Create a hub with empty channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            audio: Channel::new("audio"),
            video: Channel::new("video"),
            chat: Channel::new("chat"),
        }
    }

    /// The media channel for `kind`.
    #[must_use]
    pub fn media(&self, kind: MediaKind) -> &Channel<StreamSink> {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }

    /// The chat channel and member registry.
    #[must_use]
    pub fn chat(&self) -> &Channel<ChatMember> {
        &self.chat
    }

    /// Point-in-time subscriber counts across all channels.
    #[must_use]
    pub fn stats(&self) -> HubStats {
        HubStats {
            audio_subscribers: self.audio.len(),
            video_subscribers: self.video.len(),
            chat_members: self.chat.len(),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriber counts reported by [`Hub::stats`].
#[derive(Debug, Clone, Copy)]
pub struct HubStats {
    /// Audio viewers currently subscribed.
    pub audio_subscribers: usize,
    /// Video viewers currently subscribed.
    pub video_subscribers: usize,
    /// Chat members currently registered.
    pub chat_members: usize,
}
