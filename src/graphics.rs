//! Image directory and graphics data
//!
//! An object's graphics are stored as an image directory (entry count, scan
//! line length, then one [`ImageEntry`] per image) followed by the graphics
//! region that entry start addresses point into. Each entry is either a
//! bitmap (direct or compacted) or a palette of BGR colours.

use crate::bitmap::{decode_compacted, encode_compacted, ImageEntry, ImageKind, PaletteImage};
use crate::common::{read_error, IMAGE_ENTRY_SIZE};
use crate::{ObjDataError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use std::io::{Read, Write};

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

/// A run of palette colours
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    /// Colours, in palette order
    pub colors: Vec<Rgb>,
}

/// Decoded data of one directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Graphic {
    /// A bitmap of palette indices
    Image(PaletteImage),
    /// Palette colours
    Palette(Palette),
}

/// The image directory preceding the graphics region
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageDirectory {
    /// Total scan line length, kept as read
    pub scan_line_length: i32,
    /// One entry per image
    pub entries: Vec<ImageEntry>,
}

impl ImageDirectory {
    /// Read the image directory
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let count = reader.read_u32::<LittleEndian>().map_err(read_error)?;
        let scan_line_length = reader.read_i32::<LittleEndian>().map_err(read_error)?;

        let mut entries = Vec::with_capacity((count as usize).min(0x1_0000));
        for _ in 0..count {
            entries.push(ImageEntry::read(reader)?);
        }

        Ok(Self {
            scan_line_length,
            entries,
        })
    }

    /// Write the image directory
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;
        writer.write_i32::<LittleEndian>(self.scan_line_length)?;
        for entry in &self.entries {
            entry.write(writer)?;
        }
        Ok(())
    }
}

/// Decode one entry from the graphics region
pub fn decode_graphic(region: &[u8], entry: &ImageEntry) -> Result<Graphic> {
    let (width, height) = entry.dimensions()?;
    let start = entry.start_address as usize;

    match entry.kind()? {
        ImageKind::Direct => {
            let pixels = region
                .get(start..start + width * height)
                .ok_or(ObjDataError::UnexpectedEof)?;
            Ok(Graphic::Image(PaletteImage::from_pixels(
                width,
                height,
                pixels.to_vec(),
            )?))
        }
        ImageKind::Compacted => Ok(Graphic::Image(decode_compacted(region, entry)?)),
        ImageKind::Palette => {
            let bytes = region
                .get(start..start + width * 3)
                .ok_or(ObjDataError::UnexpectedEof)?;
            // Stored blue, green, red
            let colors = bytes
                .chunks_exact(3)
                .map(|bgr| Rgb {
                    r: bgr[2],
                    g: bgr[1],
                    b: bgr[0],
                })
                .collect();
            Ok(Graphic::Palette(Palette { colors }))
        }
    }
}

/// Encode one entry's data as it is stored in the graphics region
///
/// The graphic must have the kind and size the entry declares; anything else
/// would be read back with the wrong shape.
pub fn encode_graphic(entry: &ImageEntry, graphic: &Graphic) -> Result<Vec<u8>> {
    let (width, height) = entry.dimensions()?;
    let mismatch = ObjDataError::GraphicMismatch { index: 0 };

    match (entry.kind()?, graphic) {
        (ImageKind::Direct | ImageKind::Compacted, Graphic::Image(image))
            if image.width() != width || image.height() != height =>
        {
            Err(mismatch)
        }
        (ImageKind::Direct, Graphic::Image(image)) => Ok(image.pixels().to_vec()),
        (ImageKind::Compacted, Graphic::Image(image)) => encode_compacted(image),
        (ImageKind::Palette, Graphic::Palette(palette)) if palette.colors.len() != width => {
            Err(mismatch)
        }
        (ImageKind::Palette, Graphic::Palette(palette)) => Ok(palette
            .colors
            .iter()
            .flat_map(|color| [color.b, color.g, color.r])
            .collect()),
        _ => Err(mismatch),
    }
}

/// An image directory together with the decoded graphics it describes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicsData {
    /// Total scan line length, kept as read
    pub scan_line_length: i32,
    /// Directory entries paired with their decoded data
    pub graphics: Vec<(ImageEntry, Graphic)>,
}

/// An entry that [`GraphicsData::read_lenient`] replaced with a blank image
#[derive(Debug)]
pub struct SkippedImage {
    /// Index of the entry in the directory
    pub index: usize,
    /// Why decoding failed
    pub error: ObjDataError,
}

impl GraphicsData {
    /// Read the directory and the graphics region, failing on the first bad entry
    ///
    /// The region extends to the end of the reader, as it does inside a
    /// decoded object chunk.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let (directory, region) = Self::read_parts(reader)?;
        let graphics = directory
            .entries
            .iter()
            .map(|entry| Ok((*entry, decode_graphic(&region, entry)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            scan_line_length: directory.scan_line_length,
            graphics,
        })
    }

    /// Read like [`GraphicsData::read`], replacing images whose segments fall
    /// outside their bounds with blank images
    ///
    /// Any other failure is still fatal.
    pub fn read_lenient<R: Read>(reader: &mut R) -> Result<(Self, Vec<SkippedImage>)> {
        let (directory, region) = Self::read_parts(reader)?;
        let mut graphics = Vec::with_capacity(directory.entries.len());
        let mut skipped = Vec::new();

        for (index, entry) in directory.entries.iter().enumerate() {
            match decode_graphic(&region, entry) {
                Ok(graphic) => graphics.push((*entry, graphic)),
                Err(error) if error.is_recoverable() => {
                    warn!("image {index} replaced with a blank image: {error}");
                    let (width, height) = entry.dimensions()?;
                    graphics.push((*entry, Graphic::Image(PaletteImage::new(width, height))));
                    skipped.push(SkippedImage { index, error });
                }
                Err(error) => return Err(error),
            }
        }

        Ok((
            Self {
                scan_line_length: directory.scan_line_length,
                graphics,
            },
            skipped,
        ))
    }

    fn read_parts<R: Read>(reader: &mut R) -> Result<(ImageDirectory, Vec<u8>)> {
        let directory = ImageDirectory::read(reader)?;
        let mut region = Vec::new();
        reader.read_to_end(&mut region)?;

        debug!(
            "read image directory: {} entries, {} byte region",
            directory.entries.len(),
            region.len()
        );
        Ok((directory, region))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }

    /// The directory as it would be written, with current start addresses
    pub fn directory(&self) -> ImageDirectory {
        ImageDirectory {
            scan_line_length: self.scan_line_length,
            entries: self.graphics.iter().map(|(entry, _)| *entry).collect(),
        }
    }

    /// Write the directory and the graphics region
    ///
    /// Start addresses are only known once every earlier entry has been
    /// serialized, so each entry's `start_address` is updated in place.
    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        let mut region = Vec::new();
        for (index, (entry, graphic)) in self.graphics.iter_mut().enumerate() {
            entry.start_address = region.len() as u32;
            let data = encode_graphic(entry, graphic).map_err(|err| match err {
                ObjDataError::GraphicMismatch { .. } => ObjDataError::GraphicMismatch { index },
                other => other,
            })?;
            region.extend_from_slice(&data);
        }

        self.directory().write(writer)?;
        writer.write_all(&region)?;
        Ok(())
    }

    /// Serialized size of the directory alone
    pub fn directory_size(&self) -> usize {
        8 + self.graphics.len() * IMAGE_ENTRY_SIZE
    }
}
