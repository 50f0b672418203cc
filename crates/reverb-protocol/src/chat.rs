//! Chat envelopes for the Reverb relay.
//!
//! Chat rides the relay as UTF-8 JSON, one envelope per unidirectional
//! stream. Clients send commands (`enter`, `comment`); the server fans out
//! notices of the form `{"name": ..., "comment": ...}`. The private welcome
//! sent in response to `enter` additionally carries `"command":"comment"` —
//! an asymmetry inherited from the first deployed client, preserved so that
//! client keeps working.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sender name on every server-originated notice.
pub const SERVER_NAME: &str = "server";

/// Errors produced while interpreting a client chat payload.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The payload was not a JSON envelope this protocol can act on,
    /// including a known command missing its required field.
    #[error("malformed chat payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed JSON carrying a command this server does not know.
    #[error("unrecognized chat command {0:?}")]
    UnknownCommand(String),
}

/// A command sent by a chat client, one per stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum ChatCommand {
    /// Join the room under a display name.
    Enter {
        /// Display name shown on every relayed comment.
        name: String,
    },

    /// Say something; valid only after a successful `enter`.
    Comment {
        /// The comment text to relay.
        comment: String,
    },
}

/// Parse one complete client payload.
///
/// Junk bytes and envelopes with an unknown `command` fail differently so
/// the caller can log them apart.
///
/// # Errors
///
/// [`ChatError::Malformed`] if the payload is not valid JSON or omits a
/// required field; [`ChatError::UnknownCommand`] if it is a well-formed
/// envelope whose command is not recognized.
pub fn parse_command(data: &[u8]) -> Result<ChatCommand, ChatError> {
    match serde_json::from_slice::<ChatCommand>(data) {
        Ok(command) => Ok(command),
        Err(err) => match serde_json::from_slice::<serde_json::Value>(data) {
            Ok(value) => match value.get("command").and_then(|c| c.as_str()) {
                Some(command) if command != "enter" && command != "comment" => {
                    Err(ChatError::UnknownCommand(command.to_owned()))
                }
                _ => Err(ChatError::Malformed(err)),
            },
            Err(_) => Err(ChatError::Malformed(err)),
        },
    }
}

/// A server-to-client chat notice.
///
/// `command` is serialized only when present; see the module docs for why
/// the welcome carries it and broadcasts do not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNotice {
    /// Only the private welcome sets this, to `"comment"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Display name of the speaker (`server` for notices).
    pub name: String,
    /// The comment text.
    pub comment: String,
}

impl ChatNotice {
    /// Private welcome for a member that just entered.
    #[must_use]
    pub fn welcome(name: &str) -> Self {
        Self {
            command: Some("comment".to_owned()),
            name: SERVER_NAME.to_owned(),
            comment: format!("Welcome, {name}"),
        }
    }

    /// Public announcement that a member entered.
    #[must_use]
    pub fn joined(name: &str) -> Self {
        Self {
            command: None,
            name: SERVER_NAME.to_owned(),
            comment: format!("{name} joined"),
        }
    }

    /// Public announcement that a member left.
    #[must_use]
    pub fn left(name: &str) -> Self {
        Self {
            command: None,
            name: SERVER_NAME.to_owned(),
            comment: format!("{name} left"),
        }
    }

    /// A member's comment, relayed under their registered name.
    #[must_use]
    pub fn comment(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            command: None,
            name: name.into(),
            comment: comment.into(),
        }
    }

    /// Encode to the wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn encode(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
