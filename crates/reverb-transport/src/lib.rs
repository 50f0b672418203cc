//! # mozue-reverb-transport
//!
//! WebTransport plumbing for the Reverb media relay, built on `wtransport`.
//!
//! This crate owns everything that touches the wire: binding the server
//! endpoint, accepting sessions, pumping inbound stream activity into
//! [`SessionEvent`](mozue_reverb_core::SessionEvent) values, and draining
//! each session's outbound queue onto fresh unidirectional streams. The
//! routing and relay logic in `mozue-reverb-core` stays I/O-free.

pub mod endpoint;
pub mod error;
pub mod session;

pub use endpoint::{connect_request, RelayEndpoint};
pub use error::TransportError;
pub use session::{pump_session, spawn_uni_writer};
