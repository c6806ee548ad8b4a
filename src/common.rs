//! Common types and constants for object data files
//!
//! This module defines the error type, the chunk header and the wire-level
//! constants shared by the chunk codecs, the sprite compaction codec and the
//! checksum engine.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use thiserror::Error;

/// Encoding applied to the chunk that follows the object header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkEncoding {
    /// Stored verbatim
    Raw = 0,
    /// PackBits-style run-length encoding
    Rle = 1,
    /// Back-reference compression followed by run-length encoding
    RleCompressed = 2,
    /// Per-byte bit rotation
    Rotate = 3,
}

impl ChunkEncoding {
    /// Create a ChunkEncoding from a raw value
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ChunkEncoding::Raw),
            1 => Ok(ChunkEncoding::Rle),
            2 => Ok(ChunkEncoding::RleCompressed),
            3 => Ok(ChunkEncoding::Rotate),
            _ => Err(ObjDataError::InvalidEncoding(value)),
        }
    }

    /// Short lowercase name, as used by the command-line tool
    pub fn name(&self) -> &'static str {
        match self {
            ChunkEncoding::Raw => "raw",
            ChunkEncoding::Rle => "rle",
            ChunkEncoding::RleCompressed => "rle-compressed",
            ChunkEncoding::Rotate => "rotate",
        }
    }
}

/// Header preceding every encoded chunk (5 bytes on the wire)
///
/// `chunk_size` is the number of *encoded* bytes for the run-length
/// encodings and the number of bytes to read for raw and rotated chunks.
/// The encoders overwrite it with the length they produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Encoding used by the chunk
    pub encoding: ChunkEncoding,
    /// Size of the chunk in bytes, see the type docs
    pub chunk_size: u32,
}

impl ChunkHeader {
    /// Create a header for a chunk that has not been encoded yet
    pub fn new(encoding: ChunkEncoding) -> Self {
        Self {
            encoding,
            chunk_size: 0,
        }
    }

    /// Read a chunk header, rejecting unknown encodings before the size is read
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let encoding = ChunkEncoding::from_u8(reader.read_u8().map_err(read_error)?)?;
        let chunk_size = reader.read_u32::<LittleEndian>().map_err(read_error)?;
        Ok(Self {
            encoding,
            chunk_size,
        })
    }

    /// Write the chunk header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u8(self.encoding as u8)?;
        writer.write_u32::<LittleEndian>(self.chunk_size)?;
        Ok(())
    }
}

impl Default for ChunkHeader {
    fn default() -> Self {
        Self::new(ChunkEncoding::Raw)
    }
}

/// Error type for object data operations
#[derive(Debug, Error)]
pub enum ObjDataError {
    /// Unknown chunk encoding byte
    #[error("Invalid chunk encoding: {0} (expected 0 to 3)")]
    InvalidEncoding(u8),

    /// Image flags that select neither a bitmap nor a palette
    #[error("Unsupported image flags: {0:#06X}")]
    UnsupportedImageFlags(u16),

    /// Image entry with negative dimensions
    #[error("Invalid image size: {width}x{height}")]
    InvalidImageSize {
        /// Declared width
        width: i16,
        /// Declared height
        height: i16,
    },

    /// A graphic does not match the kind its directory entry declares
    #[error("Graphic {index} does not match its image entry flags")]
    GraphicMismatch {
        /// Index of the entry in the image directory
        index: usize,
    },

    /// Stream ended before the chunk was complete
    #[error("Unexpected end of stream while reading {} chunk of {} bytes", .header.encoding.name(), .header.chunk_size)]
    TruncatedChunk {
        /// Header of the chunk being decoded
        header: ChunkHeader,
    },

    /// Unexpected end of input
    #[error("Unexpected end of input")]
    UnexpectedEof,

    /// Back-reference pointing before the start of the output
    #[error("Invalid back-reference at output position {position}: distance {distance}")]
    InvalidBackReference {
        /// Output length when the reference was read
        position: usize,
        /// Distance back into the output
        distance: usize,
    },

    /// Compacted scan segment outside the image
    #[error("Pixel ({x}, {y}) lies outside the {width}x{height} image")]
    OutOfBounds {
        /// Column of the first pixel that does not fit
        x: usize,
        /// Row being decoded
        y: usize,
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },

    /// Image cannot be represented in the compacted format
    #[error("Image too large to compact: {0}")]
    ImageTooLarge(String),

    /// Explicit input length larger than the supplied buffer
    #[error("Declared input length {declared} exceeds buffer length {actual}")]
    SizeMismatch {
        /// Length the caller declared
        declared: usize,
        /// Length of the buffer
        actual: usize,
    },

    /// Checksum span outside the record
    #[error("Checksum range {start}..{end} outside record of {len} bytes")]
    ChecksumRange {
        /// Start of the span
        start: usize,
        /// End of the span
        end: usize,
        /// Record length
        len: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObjDataError {
    /// Whether the caller may substitute a blank image and continue
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ObjDataError::OutOfBounds { .. })
    }
}

/// Result type alias for object data operations
pub type Result<T> = std::result::Result<T, ObjDataError>;

/// Map a read failure, keeping end-of-stream distinct from other I/O errors
pub(crate) fn read_error(err: std::io::Error) -> ObjDataError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ObjDataError::UnexpectedEof
    } else {
        ObjDataError::Io(err)
    }
}

/// Seed of the object header checksum
pub const CHECKSUM_SEED: u32 = 0xF369_A75B;

/// Size of a chunk header on the wire
pub const CHUNK_HEADER_SIZE: usize = 5;

/// Size of an object header on the wire
pub const OBJECT_HEADER_SIZE: usize = 16;

/// Offset of the chunk payload within a decoded object record
pub const RECORD_DATA_OFFSET: usize = OBJECT_HEADER_SIZE + CHUNK_HEADER_SIZE;

/// Size of an image directory entry on the wire
pub const IMAGE_ENTRY_SIZE: usize = 16;
