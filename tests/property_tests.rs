//! Property-based tests for the object data codecs
//!
//! These tests use randomized inputs to verify correctness across a wide range
//! of data patterns and edge cases.

use proptest::prelude::*;
use rct_objdata::chunk::rotate::unrotate_in_place;
use rct_objdata::chunk::{decode_repeat, decode_rle, encode_repeat, encode_rle, encode_rotate};
use rct_objdata::{
    decode_chunk_bytes, decode_sprite, encode_chunk, encode_sprite, object_checksum, ChunkEncoding,
    ChunkHeader, ImageEntry, ImageFlags, PaletteImage,
};
use std::io::Cursor;

fn rle_decode(encoded: &[u8]) -> Vec<u8> {
    let header = ChunkHeader {
        encoding: ChunkEncoding::Rle,
        chunk_size: encoded.len() as u32,
    };
    decode_rle(&mut Cursor::new(encoded), &header).unwrap()
}

proptest! {
    #[test]
    fn test_rle_round_trip(data in prop::collection::vec(any::<u8>(), 0..2000)) {
        let encoded = encode_rle(&data);
        prop_assert_eq!(rle_decode(&encoded), data);
    }
}

proptest! {
    #[test]
    fn test_rle_round_trip_runs(
        runs in prop::collection::vec((any::<u8>(), 1..300usize), 1..20)
    ) {
        // Long runs exercise the run length bound
        let data: Vec<u8> = runs
            .iter()
            .flat_map(|&(byte, len)| std::iter::repeat(byte).take(len))
            .collect();
        let encoded = encode_rle(&data);
        prop_assert_eq!(rle_decode(&encoded), data);
    }
}

proptest! {
    #[test]
    fn test_repeat_round_trip(data in prop::collection::vec(any::<u8>(), 0..1000)) {
        let encoded = encode_repeat(&data, data.len()).unwrap();
        prop_assert_eq!(decode_repeat(&encoded).unwrap(), data);
    }
}

proptest! {
    #[test]
    fn test_repeat_round_trip_patterns(
        pattern in prop::collection::vec(0..4u8, 1..12),
        repeat_count in 2..40usize
    ) {
        let data: Vec<u8> = pattern.iter().copied().cycle().take(pattern.len() * repeat_count).collect();
        let encoded = encode_repeat(&data, data.len()).unwrap();
        prop_assert_eq!(decode_repeat(&encoded).unwrap(), data);
    }
}

proptest! {
    #[test]
    fn test_rotate_round_trip(data in prop::collection::vec(any::<u8>(), 0..500)) {
        let mut encoded = encode_rotate(&data);
        prop_assert_eq!(encoded.len(), data.len());
        unrotate_in_place(&mut encoded);
        prop_assert_eq!(encoded, data);
    }
}

proptest! {
    #[test]
    fn test_chunk_round_trip_all_encodings(data in prop::collection::vec(any::<u8>(), 0..1500)) {
        for encoding in [
            ChunkEncoding::Raw,
            ChunkEncoding::Rle,
            ChunkEncoding::RleCompressed,
            ChunkEncoding::Rotate,
        ] {
            let mut header = ChunkHeader::new(encoding);
            let encoded = encode_chunk(&data, &mut header);
            prop_assert_eq!(header.chunk_size as usize, encoded.len());
            prop_assert_eq!(&decode_chunk_bytes(&encoded, &header).unwrap(), &data);
        }
    }
}

proptest! {
    #[test]
    fn test_chunk_decode_never_panics(
        encoding in 0..4u8,
        chunk_size in prop_oneof![0..600u32, (u32::MAX - 1024)..=u32::MAX],
        data in prop::collection::vec(any::<u8>(), 0..500)
    ) {
        // Random data is rarely a valid chunk, but decoding must only fail
        // gracefully
        let header = ChunkHeader {
            encoding: ChunkEncoding::from_u8(encoding).unwrap(),
            chunk_size,
        };
        let _ = decode_chunk_bytes(&data, &header);
    }
}

proptest! {
    #[test]
    fn test_chunk_encoding_deterministic(data in prop::collection::vec(any::<u8>(), 0..300)) {
        let mut first = ChunkHeader::new(ChunkEncoding::RleCompressed);
        let mut second = ChunkHeader::new(ChunkEncoding::RleCompressed);
        prop_assert_eq!(encode_chunk(&data, &mut first), encode_chunk(&data, &mut second));
        prop_assert_eq!(first, second);
    }
}

fn sprite_strategy() -> impl Strategy<Value = PaletteImage> {
    (1..200usize, 1..12usize).prop_flat_map(|(width, height)| {
        // Mostly opaque pixels with transparent gaps
        prop::collection::vec(prop_oneof![1 => Just(0u8), 3 => 1..=255u8], width * height)
            .prop_map(move |mut pixels| {
                // One fully transparent row and one fully opaque row
                pixels[..width].fill(0);
                if height > 1 {
                    pixels[width..2 * width].fill(0x2A);
                }
                PaletteImage::from_pixels(width, height, pixels).unwrap()
            })
    })
}

proptest! {
    #[test]
    fn test_sprite_round_trip(image in sprite_strategy()) {
        let encoded = encode_sprite(&image).unwrap();
        let entry = ImageEntry::new(
            image.width() as i16,
            image.height() as i16,
            ImageFlags::DIRECT_BITMAP | ImageFlags::COMPACTED_BITMAP,
        );
        prop_assert_eq!(decode_sprite(&encoded, &entry).unwrap(), image);
    }
}

proptest! {
    #[test]
    fn test_sprite_decode_never_panics(
        width in 0..64i16,
        height in 0..8i16,
        data in prop::collection::vec(any::<u8>(), 0..300)
    ) {
        let entry = ImageEntry::new(width, height, ImageFlags::DIRECT_BITMAP | ImageFlags::COMPACTED_BITMAP);
        let _ = decode_sprite(&data, &entry);
    }
}

proptest! {
    #[test]
    fn test_checksum_detects_single_byte_change(
        record in prop::collection::vec(any::<u8>(), 21..400),
        index in any::<prop::sample::Index>(),
        flip in 1..=255u8
    ) {
        let base = object_checksum(&record).unwrap();
        prop_assert_eq!(object_checksum(&record).unwrap(), base);

        // Only bytes that take part in the checksum
        let included: Vec<usize> = (0..1).chain(4..12).chain(21..record.len()).collect();
        let position = included[index.index(included.len())];

        let mut changed = record.clone();
        changed[position] ^= flip;
        prop_assert_ne!(object_checksum(&changed).unwrap(), base);
    }
}
