//! Handshake validation and path routing.
//!
//! One decision per session-establishment request: either a recognized path
//! with the role its handler will play, or a rejection that creates no
//! session state.

use crate::hub::MediaKind;
use reverb_protocol::handshake::{ConnectRequest, CONNECT_METHOD, WEBTRANSPORT_PROTOCOL};

/// The role a session plays, selected by its request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `/chat`: bidirectional chat participant.
    Chat,
    /// `/audio/stream` or `/video/stream`: media ingest.
    Publisher(MediaKind),
    /// `/audio/view` or `/video/view`: media subscriber.
    Viewer(MediaKind),
}

impl Role {
    /// Short label for diagnostics and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Publisher(MediaKind::Audio) => "audio-publisher",
            Self::Publisher(MediaKind::Video) => "video-publisher",
            Self::Viewer(MediaKind::Audio) => "audio-viewer",
            Self::Viewer(MediaKind::Video) => "video-viewer",
        }
    }
}

/// Outcome of validating one session-establishment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Accept the session and bind a handler for the role.
    Accept(Role),
    /// Malformed request: wrong method, missing protocol token, missing
    /// authority or path.
    BadRequest(&'static str),
    /// Well-formed request for a path this relay does not serve.
    NotFound,
}

/// Validate a session-establishment request and select the handler role.
///
/// The path table is an exact string match; anything unlisted is rejected
/// with [`RouteDecision::NotFound`] and no session state is created.
#[must_use]
pub fn route(request: &ConnectRequest) -> RouteDecision {
    if request.method.as_deref() != Some(CONNECT_METHOD) {
        return RouteDecision::BadRequest("method must be CONNECT");
    }
    if request.protocol.as_deref() != Some(WEBTRANSPORT_PROTOCOL) {
        return RouteDecision::BadRequest("missing webtransport protocol token");
    }
    if request.authority.is_none() {
        return RouteDecision::BadRequest("missing authority");
    }
    let path = match request.path.as_deref() {
        Some(path) => path,
        None => return RouteDecision::BadRequest("missing path"),
    };

    match path {
        "/chat" => RouteDecision::Accept(Role::Chat),
        "/audio/stream" => RouteDecision::Accept(Role::Publisher(MediaKind::Audio)),
        "/audio/view" => RouteDecision::Accept(Role::Viewer(MediaKind::Audio)),
        "/video/stream" => RouteDecision::Accept(Role::Publisher(MediaKind::Video)),
        "/video/view" => RouteDecision::Accept(Role::Viewer(MediaKind::Video)),
        _ => RouteDecision::NotFound,
    }
}
