//! Media frame wire layout.
//!
//! Publishers send one encoded frame per unidirectional stream, prefixed
//! with a fixed header the relay never parses:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 1    | frame kind (1 = key, 2 = delta) |
//! | 1      | 8    | timestamp, big-endian |
//! | 9      | 8    | duration, big-endian |
//!
//! The header length doubles as a plausibility floor for broadcasts: a
//! payload shorter than this cannot be a whole frame and points at a framing
//! bug upstream.

/// Size of the header preceding codec data in every media frame.
pub const FRAME_HEADER_LEN: usize = 17;
