//! # reverb-protocol
//!
//! Wire protocol definitions for the Reverb media relay.
//!
//! Reverb speaks plain WebTransport: a session is established with an
//! extended CONNECT request, every payload (media frame or chat envelope)
//! occupies exactly one unidirectional stream, and session close may arrive
//! as a capsule on the CONNECT stream itself. This crate holds the pieces of
//! that wire contract:
//!
//! - [`handshake`] - CONNECT tokens and the request view the router consumes
//! - [`chat`] - JSON chat envelopes and their parsing rules
//! - [`signal`] - the close-session capsule marker
//! - [`media`] - the media frame header layout
//!
//! ## Example
//!
//! ```rust
//! use reverb_protocol::chat::{parse_command, ChatCommand};
//!
//! let payload = br#"{"command":"enter","name":"Alice"}"#;
//! let command = parse_command(payload).unwrap();
//! assert_eq!(command, ChatCommand::Enter { name: "Alice".into() });
//! ```

pub mod chat;
pub mod handshake;
pub mod media;
pub mod signal;

pub use chat::{ChatCommand, ChatError, ChatNotice};
pub use handshake::ConnectRequest;
pub use signal::{is_close_signal, CLOSE_SIGNAL_MARKER};
