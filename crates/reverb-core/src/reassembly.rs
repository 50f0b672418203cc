//! Per-stream accumulation of fragmented messages.
//!
//! The convention is one message per stream: a stream's bytes, however the
//! transport chunks them, form exactly one logical payload, and the event's
//! `ended` flag is the sole completion signal.

use crate::ids::StreamId;
use bytes::{Bytes, BytesMut};
use std::collections::HashMap;
use tracing::trace;

/// Accumulates stream chunks into complete payloads.
#[derive(Debug, Default)]
pub struct Reassembler {
    buffers: HashMap<StreamId, BytesMut>,
}

impl Reassembler {
    /// Create an empty reassembler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the stream's accumulator, creating it on first use.
    pub fn append(&mut self, stream: StreamId, chunk: &[u8]) {
        self.buffers
            .entry(stream)
            .or_default()
            .extend_from_slice(chunk);
    }

    /// Take the complete payload of a stream that has ended.
    ///
    /// Removes the entry. A stream that ended without any prior data yields
    /// an empty payload.
    pub fn finish(&mut self, stream: StreamId) -> Bytes {
        match self.buffers.remove(&stream) {
            Some(buf) => buf.freeze(),
            None => Bytes::new(),
        }
    }

    /// Discard a stream's accumulator without yielding it.
    ///
    /// Unknown ids are a no-op; resets may arrive before any data or after
    /// a normal finish.
    pub fn release(&mut self, stream: StreamId) {
        if self.buffers.remove(&stream).is_some() {
            trace!(stream = %stream, "Released partial stream buffer");
        }
    }

    /// Number of in-flight (not yet ended) streams.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffers.len()
    }
}
