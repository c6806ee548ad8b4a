//! rct-objdata - codecs for theme-park object data files
//!
//! This crate provides a pure Rust implementation of the byte-level formats
//! inside the game's `.DAT` object files: the four chunk encodings, the
//! transparency-aware compacted sprite format, and the rolling checksum stored
//! in every object header. Output is byte-compatible with files written by the
//! game's own tools.
//!
//! # Features
//!
//! - Chunk encodings: raw, run-length, run-length with back-references, and
//!   bit rotation
//! - Compacted sprite decoding and encoding with per-image error recovery
//! - Image directory and graphics region reading and writing
//! - Object header checksum, streaming or over explicit byte ranges
//! - Optional async batch loading (`async` feature)
//!
//! # Example - Chunks
//!
//! ```
//! use rct_objdata::{decode_chunk_bytes, encode_chunk, ChunkEncoding, ChunkHeader};
//!
//! let mut header = ChunkHeader::new(ChunkEncoding::RleCompressed);
//! let encoded = encode_chunk(b"abcabcabcabc", &mut header);
//! assert_eq!(header.chunk_size as usize, encoded.len());
//!
//! let decoded = decode_chunk_bytes(&encoded, &header)?;
//! assert_eq!(decoded, b"abcabcabcabc");
//! # Ok::<(), rct_objdata::ObjDataError>(())
//! ```
//!
//! # Example - Object files
//!
//! ```no_run
//! use rct_objdata::ObjectRecord;
//!
//! let bytes = std::fs::read("WTRCYAN.DAT")?;
//! let mut object = ObjectRecord::from_bytes(&bytes)?;
//! println!("{} valid: {}", object.header.name, object.verify_checksum()?);
//!
//! // Saving recomputes the checksum and re-encodes the chunk
//! std::fs::write("WTRCYAN.DAT", object.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bitmap;
pub mod checksum;
pub mod chunk;
pub mod common;
pub mod error;
pub mod graphics;
pub mod object;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;

// Re-export commonly used types
pub use bitmap::{ImageEntry, ImageFlags, ImageKind, PaletteImage};
pub use checksum::{checksum, object_checksum, ChecksumState};
pub use chunk::{decode_chunk, decode_chunk_bytes, encode_chunk};
pub use common::{
    ChunkEncoding, ChunkHeader, ObjDataError, Result, CHECKSUM_SEED, CHUNK_HEADER_SIZE,
    OBJECT_HEADER_SIZE,
};
pub use graphics::{Graphic, GraphicsData, ImageDirectory, Palette, Rgb};
pub use object::{ObjectHeader, ObjectRecord, ObjectType, SourceType};

#[cfg(feature = "async")]
pub use async_batch::AsyncBatchProcessor;

// Convenience functions

/// Decode a compacted sprite
///
/// # Arguments
/// * `region` - The graphics region the entry's start address points into
/// * `entry` - The image directory entry
pub fn decode_sprite(region: &[u8], entry: &ImageEntry) -> Result<PaletteImage> {
    bitmap::decode_compacted(region, entry)
}

/// Encode a sprite as compacted scan segments
///
/// # Returns
/// The row offset table followed by the scan segments
pub fn encode_sprite(image: &PaletteImage) -> Result<Vec<u8>> {
    bitmap::encode_compacted(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        // Test that common types are accessible
        let _ = ChunkEncoding::Rotate;
        let _ = ImageFlags::COMPACTED_BITMAP;

        // Test that functions are accessible
        let image = PaletteImage::from_pixels(2, 1, vec![7, 9]).unwrap();
        let encoded = encode_sprite(&image).unwrap();
        let entry = ImageEntry::new(
            2,
            1,
            ImageFlags::DIRECT_BITMAP | ImageFlags::COMPACTED_BITMAP,
        );
        assert_eq!(decode_sprite(&encoded, &entry).unwrap(), image);
        assert_eq!(checksum(&[], &[]).unwrap(), CHECKSUM_SEED);
    }
}
