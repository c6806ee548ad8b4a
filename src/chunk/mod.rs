//! Chunk encoding and decoding
//!
//! The bulk of an object record is stored as a single chunk, tagged with one
//! of four encodings. This module dispatches on [`ChunkEncoding`] and wraps
//! truncation of the underlying stream into [`ObjDataError::TruncatedChunk`]
//! so the failing header travels with the error.

pub mod repeat;
pub mod rle;
pub mod rotate;

pub use repeat::{decode_repeat, encode_repeat};
pub use rle::{decode_rle, encode_rle};
pub use rotate::{decode_rotate, encode_rotate};

use crate::{ChunkEncoding, ChunkHeader, ObjDataError, Result};
use log::debug;
use std::io::Read;

/// Read and decode a chunk described by `header`
pub fn decode_chunk<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<Vec<u8>> {
    let truncated = |err: ObjDataError| match err {
        ObjDataError::UnexpectedEof => ObjDataError::TruncatedChunk { header: *header },
        other => other,
    };

    let data = match header.encoding {
        ChunkEncoding::Raw => read_chunk_bytes(reader, header)?,
        ChunkEncoding::Rle => decode_rle(reader, header)?,
        ChunkEncoding::RleCompressed => {
            let packed = decode_rle(reader, header)?;
            decode_repeat(&packed).map_err(truncated)?
        }
        ChunkEncoding::Rotate => decode_rotate(reader, header)?,
    };

    debug!(
        "decoded {} chunk: {} -> {} bytes",
        header.encoding.name(),
        header.chunk_size,
        data.len()
    );
    Ok(data)
}

/// Read exactly `header.chunk_size` bytes without trusting the size up front
pub(crate) fn read_chunk_bytes<R: Read>(reader: &mut R, header: &ChunkHeader) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    reader
        .by_ref()
        .take(u64::from(header.chunk_size))
        .read_to_end(&mut data)?;
    if data.len() < header.chunk_size as usize {
        return Err(ObjDataError::TruncatedChunk { header: *header });
    }
    Ok(data)
}

/// Encode `data` with `header.encoding`, updating `header.chunk_size`
pub fn encode_chunk(data: &[u8], header: &mut ChunkHeader) -> Vec<u8> {
    let encoded = match header.encoding {
        ChunkEncoding::Raw => data.to_vec(),
        ChunkEncoding::Rle => encode_rle(data),
        ChunkEncoding::RleCompressed => encode_rle(&repeat::pack(data)),
        ChunkEncoding::Rotate => encode_rotate(data),
    };

    header.chunk_size = encoded.len() as u32;
    debug!(
        "encoded {} chunk: {} -> {} bytes",
        header.encoding.name(),
        data.len(),
        encoded.len()
    );
    encoded
}

/// Decode a chunk held in memory
pub fn decode_chunk_bytes(data: &[u8], header: &ChunkHeader) -> Result<Vec<u8>> {
    decode_chunk(&mut std::io::Cursor::new(data), header)
}
