//! Object records
//!
//! An object file is a 16-byte [`ObjectHeader`], a [`ChunkHeader`] and one
//! encoded chunk. The header checksum covers the decoded record, so saving
//! serializes the decoded form first, checksums it, and only then encodes the
//! chunk.

use crate::checksum::object_checksum;
use crate::chunk::{decode_chunk, encode_chunk};
use crate::common::{read_error, OBJECT_HEADER_SIZE, RECORD_DATA_OFFSET};
use crate::{ChunkEncoding, ChunkHeader, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Length of the object name field
pub const NAME_LENGTH: usize = 8;

/// Kind of object, stored in the low nibble of the header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// Ride or shop
    Attraction = 0,
    /// Small scenery
    SmallScenery = 1,
    /// Large scenery
    LargeScenery = 2,
    /// Wall
    Wall = 3,
    /// Path banner
    PathBanner = 4,
    /// Footpath
    Footpath = 5,
    /// Path addition
    PathAddition = 6,
    /// Scenery group
    SceneryGroup = 7,
    /// Park entrance
    ParkEntrance = 8,
    /// Water palette
    Water = 9,
    /// Scenario text
    ScenarioText = 10,
}

impl ObjectType {
    /// Create an ObjectType from the low nibble of the flags
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => ObjectType::Attraction,
            1 => ObjectType::SmallScenery,
            2 => ObjectType::LargeScenery,
            3 => ObjectType::Wall,
            4 => ObjectType::PathBanner,
            5 => ObjectType::Footpath,
            6 => ObjectType::PathAddition,
            7 => ObjectType::SceneryGroup,
            8 => ObjectType::ParkEntrance,
            9 => ObjectType::Water,
            10 => ObjectType::ScenarioText,
            _ => return None,
        })
    }
}

/// Game the object ships with, stored in bits 4..8 of the header flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// Third-party object
    Custom = 0,
    /// Wacky Worlds expansion
    WackyWorlds = 1,
    /// Time Twister expansion
    TimeTwister = 2,
    /// Base game
    Base = 8,
}

impl SourceType {
    /// Create a SourceType from its nibble
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SourceType::Custom),
            1 => Some(SourceType::WackyWorlds),
            2 => Some(SourceType::TimeTwister),
            8 => Some(SourceType::Base),
            _ => None,
        }
    }
}

/// The 16-byte header at the start of every object file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectHeader {
    /// Type, source and game-specific flag bits
    pub flags: u32,
    /// Object name, at most eight characters
    pub name: String,
    /// Checksum of the decoded record
    pub checksum: u32,
}

impl ObjectHeader {
    /// Create a header with a zero checksum
    pub fn new(flags: u32, name: impl Into<String>) -> Self {
        Self {
            flags,
            name: name.into(),
            checksum: 0,
        }
    }

    /// Object type, if the low nibble names one
    pub fn object_type(&self) -> Option<ObjectType> {
        ObjectType::from_u8((self.flags & 0x0F) as u8)
    }

    /// Source game, if the nibble names one
    pub fn source(&self) -> Option<SourceType> {
        SourceType::from_u8(((self.flags >> 4) & 0x0F) as u8)
    }

    /// Replace the source nibble
    pub fn set_source(&mut self, source: SourceType) {
        self.flags = (self.flags & !0xF0) | ((source as u32) << 4);
    }

    /// Read an object header; spaces are dropped from the name
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let flags = reader.read_u32::<LittleEndian>().map_err(read_error)?;
        let mut name = [0u8; NAME_LENGTH];
        reader.read_exact(&mut name).map_err(read_error)?;
        let checksum = reader.read_u32::<LittleEndian>().map_err(read_error)?;

        Ok(Self {
            flags,
            name: name
                .iter()
                .filter(|&&c| c != b' ')
                .map(|&c| c as char)
                .collect(),
            checksum,
        })
    }

    /// Write the header; the name is truncated or space padded to eight bytes
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(self.flags)?;
        let mut name = [b' '; NAME_LENGTH];
        for (slot, c) in name.iter_mut().zip(self.name.chars()) {
            *slot = u8::try_from(c).unwrap_or(b'?');
        }
        writer.write_all(&name)?;
        writer.write_u32::<LittleEndian>(self.checksum)?;
        Ok(())
    }
}

/// A complete object: header, chunk header and the decoded chunk payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object header
    pub header: ObjectHeader,
    /// Chunk header; `chunk_size` reflects the last read or save
    pub chunk: ChunkHeader,
    /// Decoded payload
    pub data: Vec<u8>,
}

impl ObjectRecord {
    /// Create a record that will be saved with `encoding`
    pub fn new(header: ObjectHeader, encoding: ChunkEncoding, data: Vec<u8>) -> Self {
        Self {
            header,
            chunk: ChunkHeader::new(encoding),
            data,
        }
    }

    /// Read an object and decode its chunk; the checksum is not verified
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = ObjectHeader::read(reader)?;
        let chunk = ChunkHeader::read(reader)?;
        let data = decode_chunk(reader, &chunk)?;
        Ok(Self {
            header,
            chunk,
            data,
        })
    }

    /// Read an object held in memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut std::io::Cursor::new(bytes))
    }

    /// Serialize the decoded record the checksum is computed over
    fn decoded_record(&self) -> Result<Vec<u8>> {
        let mut record = Vec::with_capacity(RECORD_DATA_OFFSET + self.data.len());
        self.header.write(&mut record)?;
        ChunkHeader {
            encoding: self.chunk.encoding,
            chunk_size: self.data.len() as u32,
        }
        .write(&mut record)?;
        record.extend_from_slice(&self.data);
        Ok(record)
    }

    /// Checksum the record would be saved with
    pub fn computed_checksum(&self) -> Result<u32> {
        object_checksum(&self.decoded_record()?)
    }

    /// Whether the stored checksum matches the payload
    pub fn verify_checksum(&self) -> Result<bool> {
        Ok(self.computed_checksum()? == self.header.checksum)
    }

    /// Recompute the checksum, encode the chunk and write the object
    pub fn save<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        self.header.checksum = self.computed_checksum()?;
        let encoded = encode_chunk(&self.data, &mut self.chunk);

        self.header.write(writer)?;
        self.chunk.write(writer)?;
        writer.write_all(&encoded)?;
        Ok(())
    }

    /// Save the object to a new buffer
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(OBJECT_HEADER_SIZE + self.data.len());
        self.save(&mut output)?;
        Ok(output)
    }
}
