//! Run-length encoding of chunk data
//!
//! PackBits-style records: a control byte with the top bit clear is followed
//! by `control + 1` literal bytes; a control byte with the top bit set is a
//! negative count `s` and is followed by one byte repeated `-s + 1` times.

use crate::common::read_error;
use crate::{ChunkHeader, ObjDataError, Result};
use std::io::Read;

/// Longest literal record the decoder accepts (control 0x7F)
pub const MAX_LITERAL_RUN: usize = 0x80;

/// Longest repeat record the decoder accepts (control 0x80)
pub const MAX_REPEAT_RUN: usize = 0x81;

/// Scan bound of the encoder; runs it emits never exceed this length
pub const ENCODER_RUN_LIMIT: usize = 125;

/// Upper bound on the output buffer reserved before any record is read
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Decode run-length records until `header.chunk_size` encoded bytes are consumed
pub fn decode_rle<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<Vec<u8>> {
    let truncated = |err: std::io::Error| match read_error(err) {
        ObjDataError::UnexpectedEof => ObjDataError::TruncatedChunk { header: *header },
        other => other,
    };

    let encoded_size = header.chunk_size as usize;
    // chunk_size is untrusted until the records have actually been read
    let mut output = Vec::with_capacity(encoded_size.saturating_mul(2).min(MAX_PREALLOCATION));
    let mut consumed = 0;
    let mut control = [0u8; 1];

    while consumed < encoded_size {
        reader.read_exact(&mut control).map_err(truncated)?;
        let control = control[0];

        if control & 0x80 == 0 {
            let length = control as usize + 1;
            let start = output.len();
            output.resize(start + length, 0);
            reader
                .read_exact(&mut output[start..])
                .map_err(truncated)?;
            consumed += length + 1;
        } else {
            let mut value = [0u8; 1];
            reader.read_exact(&mut value).map_err(truncated)?;
            let count = (control as i8).unsigned_abs() as usize + 1;
            output.resize(output.len() + count, value[0]);
            consumed += 2;
        }
    }

    Ok(output)
}

/// Encode data as run-length records
///
/// The scan looks one byte ahead and stops at [`ENCODER_RUN_LIMIT`], which
/// keeps the output byte-identical to files written by the game tools.
pub fn encode_rle(data: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(data.len() + data.len() / ENCODER_RUN_LIMIT + 2);
    let mut position = 0;

    while position < data.len() {
        // A lone trailing byte is always a one-byte literal
        if position + 1 == data.len() {
            output.push(0x00);
            output.push(data[position]);
            position += 1;
            continue;
        }

        let first = data[position];
        let mut previous = data[position + 1];
        let repeating = previous == first;

        let mut count = 2;
        while count < ENCODER_RUN_LIMIT && position + count < data.len() {
            let next = data[position + count];
            if (next == previous) != repeating {
                // Leave the first byte of the upcoming repeat out of the literal
                if !repeating {
                    count -= 1;
                }
                break;
            }
            previous = next;
            count += 1;
        }

        if repeating {
            output.push((1 - count as i32) as u8);
            output.push(first);
        } else {
            output.push((count - 1) as u8);
            output.extend_from_slice(&data[position..position + count]);
        }

        position += count;
    }

    output
}
