//! Back-reference ("repeat") compression
//!
//! Applied before run-length encoding for [`ChunkEncoding::RleCompressed`]
//! chunks. Each control byte is either the escape `0xFF` followed by one
//! literal byte, or a reference into the previous 32 output bytes:
//!
//! ```text
//!  7 6 5 4 3 | 2 1 0
//!  32 - dist | len - 1
//! ```
//!
//! [`ChunkEncoding::RleCompressed`]: crate::ChunkEncoding::RleCompressed

use crate::{ObjDataError, Result};

/// Control byte introducing a literal
pub const LITERAL_ESCAPE: u8 = 0xFF;

/// How far back a reference may reach
pub const WINDOW_SIZE: usize = 32;

/// Longest match a single reference can copy
pub const MAX_MATCH_LENGTH: usize = 8;

/// Expand back-references
///
/// Copies are made byte by byte from the growing output, so a reference may
/// overlap the bytes it produces.
pub fn decode_repeat(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(data.len() * 2);
    let mut index = 0;

    while index < data.len() {
        let control = data[index];
        if control == LITERAL_ESCAPE {
            index += 1;
            let literal = *data.get(index).ok_or(ObjDataError::UnexpectedEof)?;
            output.push(literal);
        } else {
            let length = (control & 0x07) as usize + 1;
            let distance = WINDOW_SIZE - (control >> 3) as usize;
            if distance > output.len() {
                return Err(ObjDataError::InvalidBackReference {
                    position: output.len(),
                    distance,
                });
            }

            let source = output.len() - distance;
            for offset in 0..length {
                let byte = output[source + offset];
                output.push(byte);
            }
        }
        index += 1;
    }

    Ok(output)
}

/// Compress the first `input_len` bytes of `data` with back-references
///
/// The search walks from 32 bytes back towards the current position and keeps
/// the first longest match it sees, so a nearer match of equal length never
/// replaces a farther one. Matches do not extend into the current position.
pub fn encode_repeat(data: &[u8], input_len: usize) -> Result<Vec<u8>> {
    if input_len > data.len() {
        return Err(ObjDataError::SizeMismatch {
            declared: input_len,
            actual: data.len(),
        });
    }

    Ok(pack(&data[..input_len]))
}

/// Compress all of `data`
pub(crate) fn pack(data: &[u8]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let mut output = Vec::with_capacity(data.len() * 2);
    output.push(LITERAL_ESCAPE);
    output.push(data[0]);

    let mut position = 1;
    while position < data.len() {
        let search_end = position - 1;
        let remaining = data.len() - position - 1;

        let mut best_index = 0;
        let mut best_count = 0;
        for candidate in position.saturating_sub(WINDOW_SIZE)..=search_end {
            let max_extra = (MAX_MATCH_LENGTH - 1)
                .min(search_end - candidate)
                .min(remaining);
            let count = (0..=max_extra)
                .take_while(|&j| data[candidate + j] == data[position + j])
                .count();

            if count > best_count {
                best_index = candidate;
                best_count = count;
                if count == MAX_MATCH_LENGTH {
                    break;
                }
            }
        }

        if best_count == 0 {
            output.push(LITERAL_ESCAPE);
            output.push(data[position]);
            position += 1;
        } else {
            let distance = position - best_index;
            output.push(((best_count - 1) | ((WINDOW_SIZE - distance) << 3)) as u8);
            position += best_count;
        }
    }

    output
}
