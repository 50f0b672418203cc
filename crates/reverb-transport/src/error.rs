//! Transport-level errors.

use thiserror::Error;
use wtransport::error::{ConnectionError, StreamOpeningError, StreamWriteError};

/// Errors surfaced by the WebTransport plumbing.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying connection failed or was closed.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Opening an outbound unidirectional stream failed.
    #[error("stream opening error: {0}")]
    StreamOpening(#[from] StreamOpeningError),

    /// Writing or finishing an outbound stream failed.
    #[error("stream write error: {0}")]
    StreamWrite(#[from] StreamWriteError),

    /// Binding the server endpoint failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
