//! Metrics collection and export for the relay.
//!
//! Uses the `metrics` crate for instrumentation and exports
//! to Prometheus format.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use mozue_reverb_core::HubStats;
use std::net::SocketAddr;
use tracing::info;

/// Metric names.
pub mod names {
    pub const SESSIONS_TOTAL: &str = "reverb_sessions_total";
    pub const SESSIONS_ACTIVE: &str = "reverb_sessions_active";
    pub const SESSIONS_REJECTED: &str = "reverb_sessions_rejected";
    pub const MESSAGES_TOTAL: &str = "reverb_messages_total";
    pub const MESSAGES_BYTES: &str = "reverb_messages_bytes";
    pub const STREAM_RESETS: &str = "reverb_stream_resets";
    pub const CHANNEL_SUBSCRIBERS: &str = "reverb_channel_subscribers";
    pub const ERRORS_TOTAL: &str = "reverb_errors_total";
}

/// Initialize the metrics system.
pub fn init_metrics() {
    // Describe metrics
    metrics::describe_counter!(
        names::SESSIONS_TOTAL,
        "Total number of sessions accepted since server start"
    );
    metrics::describe_gauge!(names::SESSIONS_ACTIVE, "Current number of active sessions");
    metrics::describe_counter!(
        names::SESSIONS_REJECTED,
        "Total number of session requests turned away"
    );
    metrics::describe_counter!(names::MESSAGES_TOTAL, "Total number of messages relayed");
    metrics::describe_counter!(names::MESSAGES_BYTES, "Total bytes of stream data received");
    metrics::describe_counter!(
        names::STREAM_RESETS,
        "Total number of inbound streams reset before finishing"
    );
    metrics::describe_gauge!(
        names::CHANNEL_SUBSCRIBERS,
        "Current number of subscribers per channel"
    );
    metrics::describe_counter!(names::ERRORS_TOTAL, "Total number of errors");

    info!("Metrics initialized");
}

/// Start the Prometheus metrics server.
///
/// # Errors
///
/// Returns an error if the server cannot be started.
pub fn start_metrics_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    info!("Metrics server listening on {}", addr);
    Ok(())
}

/// Record an accepted session.
pub fn record_session_opened(role: &str) {
    counter!(names::SESSIONS_TOTAL, "role" => role.to_string()).increment(1);
    gauge!(names::SESSIONS_ACTIVE, "role" => role.to_string()).increment(1.0);
}

/// Record a finished session.
pub fn record_session_closed(role: &str) {
    gauge!(names::SESSIONS_ACTIVE, "role" => role.to_string()).decrement(1.0);
}

/// Record a session request that was turned away before acceptance.
pub fn record_rejection(reason: &str) {
    counter!(names::SESSIONS_REJECTED, "reason" => reason.to_string()).increment(1);
}

/// Record inbound stream data for a channel.
///
/// Bytes are counted per chunk; the message counter only moves when the
/// sender finishes the stream and the message is complete.
pub fn record_message(channel: &str, bytes: usize, complete: bool) {
    counter!(names::MESSAGES_BYTES, "channel" => channel.to_string()).increment(bytes as u64);
    if complete {
        counter!(names::MESSAGES_TOTAL, "channel" => channel.to_string()).increment(1);
    }
}

/// Record an inbound stream that was reset mid-message.
pub fn record_stream_reset() {
    counter!(names::STREAM_RESETS).increment(1);
}

/// Update per-channel subscriber gauges.
pub fn update_subscriber_gauges(stats: &HubStats) {
    gauge!(names::CHANNEL_SUBSCRIBERS, "channel" => "audio".to_string())
        .set(stats.audio_subscribers as f64);
    gauge!(names::CHANNEL_SUBSCRIBERS, "channel" => "video".to_string())
        .set(stats.video_subscribers as f64);
    gauge!(names::CHANNEL_SUBSCRIBERS, "channel" => "chat".to_string())
        .set(stats.chat_members as f64);
}

/// Record an error.
pub fn record_error(error_type: &str) {
    counter!(names::ERRORS_TOTAL, "type" => error_type.to_string()).increment(1);
}

/// Metrics guard that closes out the session gauges on drop.
pub struct SessionMetricsGuard {
    role: &'static str,
}

impl SessionMetricsGuard {
    /// Create a new metrics guard, recording an accepted session.
    #[must_use]
    pub fn new(role: &'static str) -> Self {
        record_session_opened(role);
        Self { role }
    }
}

impl Drop for SessionMetricsGuard {
    fn drop(&mut self) {
        record_session_closed(self.role);
    }
}
