//! Bit-rotation obfuscation
//!
//! Not a compression scheme: every byte is rotated by an amount cycling
//! through 1, 3, 5, 7. The cycle restarts at 1 for every chunk.

use super::read_chunk_bytes;
use crate::{ChunkHeader, Result};
use std::io::Read;

/// Rotation amounts, applied to successive bytes
fn shifts() -> impl Iterator<Item = u32> {
    [1, 3, 5, 7].into_iter().cycle()
}

/// Read `header.chunk_size` bytes and undo the rotation
pub fn decode_rotate<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<Vec<u8>> {
    let mut data = read_chunk_bytes(reader, header)?;
    unrotate_in_place(&mut data);
    Ok(data)
}

/// Rotate every byte right by its cycle amount
pub fn unrotate_in_place(data: &mut [u8]) {
    for (byte, shift) in data.iter_mut().zip(shifts()) {
        *byte = byte.rotate_right(shift);
    }
}

/// Rotate every byte left by its cycle amount
pub fn encode_rotate(data: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(shifts())
        .map(|(byte, shift)| byte.rotate_left(shift))
        .collect()
}
