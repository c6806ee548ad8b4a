//! Compacted bitmap encoding
//!
//! A compacted image starts with one `u16` offset per row, relative to the
//! start of the image, followed by the scan segments of every row:
//!
//! ```text
//! [count | 0x80 if last][x offset][count palette indices]
//! ```
//!
//! Pixels not covered by a segment are transparent (index 0).

use super::{ImageEntry, PaletteImage};
use crate::common::read_error;
use crate::{ObjDataError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read};

/// Header bit marking the last segment of a row
pub const LAST_SEGMENT: u8 = 0x80;

/// Longest run of pixels a single segment can hold
pub const MAX_SEGMENT_LENGTH: usize = 0x7F;

/// Palette index treated as transparent
pub const TRANSPARENT: u8 = 0x00;

/// Decode the compacted image that `entry` locates inside `region`
///
/// `region` is the graphics data that image start addresses are relative to.
/// A segment that writes past the image width fails with
/// [`ObjDataError::OutOfBounds`]; callers may treat that as a per-image
/// failure and continue with the next entry.
pub fn decode_compacted(region: &[u8], entry: &ImageEntry) -> Result<PaletteImage> {
    let (width, height) = entry.dimensions()?;
    let data = region
        .get(entry.start_address as usize..)
        .ok_or(ObjDataError::UnexpectedEof)?;
    let mut cursor = Cursor::new(data);

    let row_offsets = (0..height)
        .map(|_| cursor.read_u16::<LittleEndian>())
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(read_error)?;

    let mut image = PaletteImage::new(width, height);
    for (y, &row_offset) in row_offsets.iter().enumerate() {
        cursor.set_position(row_offset as u64);

        loop {
            let header = cursor.read_u8().map_err(read_error)?;
            let offset = cursor.read_u8().map_err(read_error)? as usize;
            let count = (header & !LAST_SEGMENT) as usize;

            if offset + count > width {
                return Err(ObjDataError::OutOfBounds {
                    x: offset.max(width),
                    y,
                    width,
                    height,
                });
            }

            cursor
                .read_exact(&mut image.row_mut(y)[offset..offset + count])
                .map_err(read_error)?;

            if header & LAST_SEGMENT != 0 {
                break;
            }
        }
    }

    Ok(image)
}

/// Encode an image as compacted scan segments
pub fn encode_compacted(image: &PaletteImage) -> Result<Vec<u8>> {
    let table_size = image.height() * 2;
    let mut row_offsets = Vec::with_capacity(image.height());
    let mut segments = Vec::new();

    for y in 0..image.height() {
        let row_offset = u16::try_from(table_size + segments.len()).map_err(|_| {
            ObjDataError::ImageTooLarge(format!("row {y} starts beyond 64 KiB"))
        })?;
        row_offsets.push(row_offset);
        encode_row(image.row(y), y, &mut segments)?;
    }

    let mut output = Vec::with_capacity(table_size + segments.len());
    for row_offset in row_offsets {
        output.write_u16::<LittleEndian>(row_offset)?;
    }
    output.extend_from_slice(&segments);
    Ok(output)
}

fn encode_row(row: &[u8], y: usize, output: &mut Vec<u8>) -> Result<()> {
    let mut start = 0;

    loop {
        while start < row.len() && row[start] == TRANSPARENT {
            start += 1;
        }

        // Only the first segment of a row can run out of pixels
        if start == row.len() {
            output.extend_from_slice(&[LAST_SEGMENT, 0]);
            return Ok(());
        }

        let offset = u8::try_from(start).map_err(|_| {
            ObjDataError::ImageTooLarge(format!("segment in row {y} starts at x = {start}"))
        })?;
        let count = row[start..]
            .iter()
            .take(MAX_SEGMENT_LENGTH)
            .take_while(|&&pixel| pixel != TRANSPARENT)
            .count();
        let end = start + count;
        let last = row[end..].iter().all(|&pixel| pixel == TRANSPARENT);

        output.push(count as u8 | if last { LAST_SEGMENT } else { 0 });
        output.push(offset);
        output.extend_from_slice(&row[start..end]);

        if last {
            return Ok(());
        }
        start = end;
    }
}
