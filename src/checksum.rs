//! Object header checksum
//!
//! A rolling, order-sensitive 32-bit tag: every included byte is XORed into
//! the low byte of the accumulator, which is then rotated left by 11 bits.
//! It is recomputed whenever a record is written; readers do not verify it.

use crate::common::{CHECKSUM_SEED, OBJECT_HEADER_SIZE, RECORD_DATA_OFFSET};
use crate::{ObjDataError, Result};
use std::ops::Range;

/// Streaming checksum accumulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumState {
    value: u32,
}

impl ChecksumState {
    /// Create an accumulator seeded with [`CHECKSUM_SEED`]
    pub fn new() -> Self {
        Self {
            value: CHECKSUM_SEED,
        }
    }

    /// Fold one byte into the accumulator
    #[inline]
    pub fn update_byte(&mut self, byte: u8) {
        let low = (self.value as u8) ^ byte;
        self.value = ((self.value & 0xFFFF_FF00) | low as u32).rotate_left(11);
    }

    /// Fold a run of bytes into the accumulator
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.update_byte(byte);
        }
    }

    /// Current checksum value
    pub fn finish(&self) -> u32 {
        self.value
    }
}

impl Default for ChecksumState {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum the given spans of `record`, in order
pub fn checksum(record: &[u8], ranges: &[Range<usize>]) -> Result<u32> {
    let mut state = ChecksumState::new();
    for range in ranges {
        let span = record
            .get(range.clone())
            .ok_or(ObjDataError::ChecksumRange {
                start: range.start,
                end: range.end,
                len: record.len(),
            })?;
        state.update(span);
    }
    Ok(state.finish())
}

/// Spans of a decoded object record that participate in its checksum
///
/// The low byte of the flags, the 8-character name and the decoded chunk
/// payload. The rest of the flags, the stored checksum and the chunk header
/// are excluded.
pub fn object_checksum_ranges(record_len: usize) -> [Range<usize>; 3] {
    [0..1, 4..OBJECT_HEADER_SIZE - 4, RECORD_DATA_OFFSET..record_len]
}

/// Checksum a decoded object record laid out as header, chunk header, payload
pub fn object_checksum(record: &[u8]) -> Result<u32> {
    checksum(record, &object_checksum_ranges(record.len()))
}
