//! CONNECT handshake vocabulary.
//!
//! WebTransport sessions are established with an extended CONNECT request;
//! routing only ever looks at four of its pseudo-headers, captured here as
//! [`ConnectRequest`].

/// Method required on a session-establishment request.
pub const CONNECT_METHOD: &str = "CONNECT";

/// Protocol-upgrade token required alongside [`CONNECT_METHOD`].
pub const WEBTRANSPORT_PROTOCOL: &str = "webtransport";

/// The headers of a session-establishment request that routing consumes.
///
/// Every field is optional: a misbehaving peer may omit any of them, and the
/// router turns absences into rejections instead of assuming the transport
/// library filtered them out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectRequest {
    /// `:method` pseudo-header.
    pub method: Option<String>,
    /// `:protocol` pseudo-header.
    pub protocol: Option<String>,
    /// `:authority` pseudo-header.
    pub authority: Option<String>,
    /// `:path` pseudo-header.
    pub path: Option<String>,
}

impl ConnectRequest {
    /// A well-formed WebTransport CONNECT for `authority` + `path`.
    ///
    /// Transport adapters that pre-validate method and protocol (wtransport
    /// does) use this to fill in the tokens they already checked.
    #[must_use]
    pub fn webtransport(authority: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: Some(CONNECT_METHOD.to_owned()),
            protocol: Some(WEBTRANSPORT_PROTOCOL.to_owned()),
            authority: Some(authority.into()),
            path: Some(path.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webtransport_request_fills_tokens() {
        let request = ConnectRequest::webtransport("localhost:4433", "/chat");
        assert_eq!(request.method.as_deref(), Some(CONNECT_METHOD));
        assert_eq!(request.protocol.as_deref(), Some(WEBTRANSPORT_PROTOCOL));
        assert_eq!(request.authority.as_deref(), Some("localhost:4433"));
        assert_eq!(request.path.as_deref(), Some("/chat"));
    }

    #[test]
    fn test_default_is_empty() {
        let request = ConnectRequest::default();
        assert_eq!(request.method, None);
        assert_eq!(request.path, None);
    }
}
