/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Canary frame layout and decoding.
//!
//! Every canary payload starts with a fixed 24 byte big-endian header:
//!
//! | offset | size | field |
//! |--------|------|-------|
//! | 0      | 8    | producer timestamp, ms since epoch |
//! | 8      | 4    | frame index |
//! | 12     | 4    | declared payload size |
//! | 16     | 8    | CRC32 of the payload with this slot zeroed |
//!
//! followed by filler bytes that only matter to the size and checksum.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

pub const TIMESTAMP_OFFSET: usize = 0;
pub const INDEX_OFFSET: usize = 8;
pub const SIZE_OFFSET: usize = 12;
pub const CHECKSUM_OFFSET: usize = 16;
pub const CHECKSUM_LEN: usize = 8;

/// Bytes taken by the canary header.
pub const CANARY_METADATA_SIZE: usize = CHECKSUM_OFFSET + CHECKSUM_LEN;

/// A frame as delivered by the transport, together with the fragment it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Raw frame payload.
    pub payload: Vec<u8>,
    /// Offset of this frame from the start of its fragment, in milliseconds.
    pub frame_time_delta: i64,
    /// Producer-side timestamp at which the fragment began, in milliseconds.
    pub fragment_start_time: Option<i64>,
}

impl Frame {
    pub fn new(payload: Vec<u8>, frame_time_delta: i64, fragment_start_time: Option<i64>) -> Self {
        Self {
            payload,
            frame_time_delta,
            fragment_start_time,
        }
    }
}

/// Header fields decoded from a canary payload, plus what the payload actually is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanaryFrame {
    pub timestamp_ms: i64,
    pub frame_index: u32,
    pub declared_size: u32,
    pub checksum: u64,
    /// CRC32 of the payload with the checksum slot zeroed.
    pub computed_crc: u32,
    pub actual_size: usize,
}

impl CanaryFrame {
    /// Decode the header of `payload`. The caller's buffer is left untouched.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < CANARY_METADATA_SIZE {
            return Err(FrameError::TooShort {
                len: payload.len(),
                required: CANARY_METADATA_SIZE,
            });
        }

        Ok(Self {
            timestamp_ms: i64::from_be_bytes(be_bytes(payload, TIMESTAMP_OFFSET)),
            frame_index: u32::from_be_bytes(be_bytes(payload, INDEX_OFFSET)),
            declared_size: u32::from_be_bytes(be_bytes(payload, SIZE_OFFSET)),
            checksum: u64::from_be_bytes(be_bytes(payload, CHECKSUM_OFFSET)),
            computed_crc: zeroed_checksum_crc(payload),
            actual_size: payload.len(),
        })
    }

    /// The checksum a well-formed payload must carry in its checksum slot.
    pub fn checksum_for(payload: &[u8]) -> Result<u64> {
        if payload.len() < CANARY_METADATA_SIZE {
            return Err(FrameError::TooShort {
                len: payload.len(),
                required: CANARY_METADATA_SIZE,
            });
        }
        Ok(zeroed_checksum_crc(payload) as u64)
    }

    pub fn size_matches(&self) -> bool {
        self.declared_size as usize == self.actual_size
    }

    pub fn checksum_matches(&self) -> bool {
        self.computed_crc as u64 == self.checksum
    }

    /// The embedded timestamp must equal the fragment start plus the frame's offset.
    pub fn timestamp_matches(&self, fragment_start_time: i64, frame_time_delta: i64) -> bool {
        fragment_start_time.checked_add(frame_time_delta) == Some(self.timestamp_ms)
    }
}

fn be_bytes<const N: usize>(buf: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[offset..offset + N]);
    out
}

/// CRC32 over the whole payload, header included, with the checksum slot
/// read as zeros. Equivalent to zeroing a copy and hashing it.
fn zeroed_checksum_crc(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&payload[..CHECKSUM_OFFSET]);
    hasher.update(&[0u8; CHECKSUM_LEN]);
    hasher.update(&payload[CANARY_METADATA_SIZE..]);
    hasher.finalize()
}
