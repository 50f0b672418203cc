//! WebTransport server endpoint wrapper.

use crate::error::TransportError;
use reverb_protocol::handshake::ConnectRequest;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use wtransport::endpoint::endpoint_side::Server;
use wtransport::endpoint::{IncomingSession, SessionRequest};
use wtransport::{Endpoint, Identity, ServerConfig};

/// Keep-alive interval for accepted sessions.
const KEEP_ALIVE: Duration = Duration::from_secs(3);

/// A bound WebTransport server endpoint accepting relay sessions.
pub struct RelayEndpoint {
    endpoint: Endpoint<Server>,
}

impl RelayEndpoint {
    /// Bind the endpoint and start listening.
    ///
    /// # Errors
    ///
    /// Returns an error if the UDP socket cannot be bound.
    pub fn bind(addr: SocketAddr, identity: Identity) -> Result<Self, TransportError> {
        let config = ServerConfig::builder()
            .with_bind_address(addr)
            .with_identity(identity)
            .keep_alive_interval(Some(KEEP_ALIVE))
            .build();

        let endpoint = Endpoint::server(config)?;
        info!(address = %addr, "WebTransport endpoint listening");
        Ok(Self { endpoint })
    }

    /// Wait for the next incoming session.
    pub async fn accept(&self) -> IncomingSession {
        self.endpoint.accept().await
    }

    /// The local address the endpoint is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.endpoint.local_addr().ok()
    }
}

/// The routing view of a session-establishment request.
///
/// wtransport only surfaces requests that already passed extended-CONNECT
/// validation, so the method and protocol fields carry the canonical
/// tokens.
#[must_use]
pub fn connect_request(request: &SessionRequest) -> ConnectRequest {
    ConnectRequest::webtransport(request.authority(), request.path())
}
