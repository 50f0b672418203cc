//! Shared fixtures for the Reverb benchmarks.

use bytes::{BufMut, Bytes, BytesMut};
use reverb_protocol::media::FRAME_HEADER_LEN;

/// Build a media payload: a frame header (kind, timestamp, duration)
/// followed by `body` zero bytes standing in for codec data.
pub fn media_frame(body: usize) -> Bytes {
    let mut frame = BytesMut::with_capacity(FRAME_HEADER_LEN + body);
    frame.put_u8(1); // key frame
    frame.put_u64(0); // timestamp
    frame.put_u64(20_000); // duration in microseconds
    frame.resize(FRAME_HEADER_LEN + body, 0);
    frame.freeze()
}

/// Split `payload` into at most `pieces` nearly equal chunks, the way a
/// sender fragments one message across stream writes.
pub fn chunked(payload: &[u8], pieces: usize) -> Vec<Bytes> {
    let step = ((payload.len() + pieces - 1) / pieces).max(1);
    payload.chunks(step).map(Bytes::copy_from_slice).collect()
}
