//! Session-close control signal.
//!
//! A client closing a WebTransport session sends a
//! `CLOSE_WEBTRANSPORT_SESSION` capsule on the session's CONNECT stream.
//! Capsule types are QUIC varints on the wire: the two-byte form sets the
//! `0x40` length bit, so type `0x2843` arrives as `0x68 0x43`. Transports
//! that surface raw capsule bytes match them here; transports that digest
//! capsules themselves report a closed connection instead.

/// `CLOSE_WEBTRANSPORT_SESSION` capsule type (draft-ietf-webtrans-http3-02).
pub const CLOSE_CAPSULE_TYPE: u16 = 0x2843;

/// The capsule type as it appears on the wire (two-byte QUIC varint).
pub const CLOSE_SIGNAL_MARKER: [u8; 2] = [0x68, 0x43];

/// Check whether an ended control payload is a close signal.
///
/// Requires at least three bytes: the marker plus the capsule's length byte.
#[must_use]
pub fn is_close_signal(data: &[u8], ended: bool) -> bool {
    is_close_signal_with(CLOSE_SIGNAL_MARKER, data, ended)
}

/// [`is_close_signal`] against an arbitrary marker.
#[must_use]
pub fn is_close_signal_with(marker: [u8; 2], data: &[u8], ended: bool) -> bool {
    ended && data.len() >= 3 && data.starts_with(&marker)
}
