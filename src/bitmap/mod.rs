//! Sprite metadata and pixel storage
//!
//! Images are described by 16-byte [`ImageEntry`] records in the image
//! directory. The pixels of a bitmap entry are 8-bit palette indices, held in
//! a row-major [`PaletteImage`].

pub mod compact;

pub use compact::{decode_compacted, encode_compacted};

use crate::common::read_error;
use crate::{ObjDataError, Result};
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

bitflags! {
    /// Image type flags of a directory entry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageFlags: u16 {
        /// Pixels are palette indices
        const DIRECT_BITMAP = 1 << 0;
        /// Bitmap is stored as compacted scan segments
        const COMPACTED_BITMAP = 1 << 2;
        /// Entry holds palette colours instead of pixels
        const PALETTE_ENTRIES = 1 << 3;
        /// Only set on land tiles; has no effect on decoding
        const LAND_TILE = 1 << 4;

        // Unknown bits survive a read/write cycle
        const _ = !0;
    }
}

impl Default for ImageFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// How the data of an entry is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Row-major `width * height` palette indices
    Direct,
    /// Row offset table followed by scan segments
    Compacted,
    /// `width` BGR colour triplets
    Palette,
}

/// An entry of the image directory (16 bytes on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageEntry {
    /// Offset of the data from the start of the graphics region
    pub start_address: u32,
    /// Width of the image, or number of palette colours
    pub width: i16,
    /// Height of the image
    pub height: i16,
    /// Horizontal drawing offset, or first palette index
    pub x_offset: i16,
    /// Vertical drawing offset
    pub y_offset: i16,
    /// Image type flags
    pub flags: ImageFlags,
    /// Reserved
    pub unused: u16,
}

impl ImageEntry {
    /// Create an entry for an image of the given size
    pub fn new(width: i16, height: i16, flags: ImageFlags) -> Self {
        Self {
            width,
            height,
            flags,
            ..Self::default()
        }
    }

    /// Resolve the flags to the storage kind
    pub fn kind(&self) -> Result<ImageKind> {
        if self.flags.contains(ImageFlags::DIRECT_BITMAP) {
            if self.flags.contains(ImageFlags::COMPACTED_BITMAP) {
                Ok(ImageKind::Compacted)
            } else {
                Ok(ImageKind::Direct)
            }
        } else if self.flags.contains(ImageFlags::PALETTE_ENTRIES) {
            Ok(ImageKind::Palette)
        } else {
            Err(ObjDataError::UnsupportedImageFlags(self.flags.bits()))
        }
    }

    /// Width and height as sizes, rejecting negative values
    pub fn dimensions(&self) -> Result<(usize, usize)> {
        if self.width < 0 || self.height < 0 {
            return Err(ObjDataError::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok((self.width as usize, self.height as usize))
    }

    /// Read an image entry
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut read = || -> std::io::Result<Self> {
            Ok(Self {
                start_address: reader.read_u32::<LittleEndian>()?,
                width: reader.read_i16::<LittleEndian>()?,
                height: reader.read_i16::<LittleEndian>()?,
                x_offset: reader.read_i16::<LittleEndian>()?,
                y_offset: reader.read_i16::<LittleEndian>()?,
                flags: ImageFlags::from_bits_retain(reader.read_u16::<LittleEndian>()?),
                unused: reader.read_u16::<LittleEndian>()?,
            })
        };
        read().map_err(read_error)
    }

    /// Write the image entry
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.start_address)?;
        writer.write_i16::<LittleEndian>(self.width)?;
        writer.write_i16::<LittleEndian>(self.height)?;
        writer.write_i16::<LittleEndian>(self.x_offset)?;
        writer.write_i16::<LittleEndian>(self.y_offset)?;
        writer.write_u16::<LittleEndian>(self.flags.bits())?;
        writer.write_u16::<LittleEndian>(self.unused)?;
        Ok(())
    }
}

/// A grid of 8-bit palette indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl PaletteImage {
    /// Create an image filled with index 0
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Create an image from row-major pixels
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width * height {
            return Err(ObjDataError::SizeMismatch {
                declared: width * height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Mutable access to one row of pixels
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Pixel at `(x, y)`, if inside the image
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Set the pixel at `(x, y)`
    pub fn set(&mut self, x: usize, y: usize, value: u8) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(ObjDataError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.pixels[y * self.width + x] = value;
        Ok(())
    }
}
