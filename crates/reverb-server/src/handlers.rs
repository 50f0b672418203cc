//! Session handlers for the Reverb relay.
//!
//! This module handles the session lifecycle: routing accepted CONNECT
//! requests to a role, pumping inbound stream events through the session
//! state machine, and tearing registry entries down when the peer is gone.

use crate::config::Config;
use crate::metrics::{self, SessionMetricsGuard};
use anyhow::{Context, Result};
use mozue_reverb_core::{
    route, ConnectionId, Handler, Hub, Role, RouteDecision, Session, SessionEvent, StreamSink,
};
use mozue_reverb_transport::{connect_request, pump_session, spawn_uni_writer, RelayEndpoint};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use wtransport::endpoint::IncomingSession;
use wtransport::{Identity, VarInt};

/// Run the WebTransport relay server.
///
/// # Errors
///
/// Returns an error if the endpoint fails to bind.
pub async fn run_server(config: Config, identity: Identity) -> Result<()> {
    // Start metrics server if enabled
    if config.metrics.enabled {
        if let Err(e) = metrics::start_metrics_server(config.metrics.port) {
            error!("Failed to start metrics server: {}", e);
        }
    }

    let addr = config.bind_addr()?;
    let endpoint =
        RelayEndpoint::bind(addr, identity).context("Failed to bind WebTransport endpoint")?;
    let hub = Arc::new(Hub::new());

    info!("Reverb relay listening on {}", addr);
    info!("Session paths: /chat, /audio/{{stream,view}}, /video/{{stream,view}}");

    loop {
        let incoming = endpoint.accept().await;
        tokio::spawn(handle_session(incoming, Arc::clone(&hub)));
    }
}

/// Drive one incoming session from handshake to teardown.
async fn handle_session(incoming: IncomingSession, hub: Arc<Hub>) {
    let request = match incoming.await {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "Session handshake failed");
            return;
        }
    };

    let role = match route(&connect_request(&request)) {
        RouteDecision::Accept(role) => role,
        RouteDecision::NotFound => {
            info!(path = %request.path(), "No handler for path");
            metrics::record_rejection("not_found");
            request.not_found().await;
            return;
        }
        RouteDecision::BadRequest(reason) => {
            warn!(reason, "Rejecting malformed session request");
            metrics::record_rejection("bad_request");
            request.forbidden().await;
            return;
        }
    };

    let connection = match request.accept().await {
        Ok(connection) => connection,
        Err(e) => {
            warn!(error = %e, "Failed to complete session handshake");
            metrics::record_error("accept");
            return;
        }
    };

    // Record session metrics
    let _metrics_guard = SessionMetricsGuard::new(role.as_str());

    let id = ConnectionId::next();
    info!(connection = %id, role = role.as_str(), "Session established");

    // Outbound half: every payload queued on the sink becomes one fresh
    // unidirectional stream opened by the writer task.
    let (sink, outbound) = StreamSink::channel();
    spawn_uni_writer(connection.clone(), id, outbound);

    let mut session = Session::new(id);
    if let Err(e) = session.bind(Handler::build(role, Arc::clone(&hub), id, sink)) {
        error!(connection = %id, error = %e, "Session refused its handler");
        connection.close(VarInt::from_u32(1), b"internal error");
        return;
    }
    metrics::update_subscriber_gauges(&hub.stats());

    // Inbound half: per-stream reader tasks feed one serialized event queue.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    tokio::spawn(pump_session(connection.clone(), id, events_tx));

    while let Some(event) = events_rx.recv().await {
        observe_event(role, &event);
        let roster_may_change =
            role == Role::Chat && matches!(event, SessionEvent::StreamData { ended: true, .. });
        if session.handle_event(event) {
            break;
        }
        if roster_may_change {
            metrics::update_subscriber_gauges(&hub.stats());
        }
    }

    // Cleanup: drop registry entries, then tell the peer we are done
    session.close();
    metrics::update_subscriber_gauges(&hub.stats());
    connection.close(VarInt::from_u32(0), b"");

    debug!(connection = %id, "Session finished");
}

/// Feed the channel counters from one inbound event.
fn observe_event(role: Role, event: &SessionEvent) {
    match event {
        SessionEvent::StreamData { data, ended, .. } => {
            if let Some(channel) = ingest_channel(role) {
                metrics::record_message(channel, data.len(), *ended);
            }
        }
        SessionEvent::StreamReset { .. } => metrics::record_stream_reset(),
        _ => {}
    }
}

/// The channel a role publishes into, if any.
fn ingest_channel(role: Role) -> Option<&'static str> {
    match role {
        Role::Chat => Some("chat"),
        Role::Publisher(kind) => Some(kind.as_str()),
        Role::Viewer(_) => None,
    }
}
