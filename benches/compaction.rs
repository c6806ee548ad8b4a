use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rct_objdata::{decode_sprite, encode_sprite, ImageEntry, ImageFlags, PaletteImage};
use std::hint::black_box;
use std::time::Duration;

/// A sprite with a transparent border and a few holes per row
fn generate_sprite(width: usize, height: usize) -> PaletteImage {
    let mut image = PaletteImage::new(width, height);
    for y in 0..height {
        let margin = (y * 3) % (width / 4 + 1);
        for x in margin..width - margin {
            if (x + y) % 23 != 0 {
                image
                    .set(x, y, ((x * 5 + y) % 200 + 10) as u8)
                    .expect("pixel in bounds");
            }
        }
    }
    image
}

fn sprite_compaction(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprite_compaction");
    group.measurement_time(Duration::from_secs(5));

    for (width, height) in [(32, 32), (64, 96), (250, 160)].iter() {
        let image = generate_sprite(*width, *height);
        let encoded = encode_sprite(&image).expect("Encoding failed");
        let entry = ImageEntry::new(
            *width as i16,
            *height as i16,
            ImageFlags::DIRECT_BITMAP | ImageFlags::COMPACTED_BITMAP,
        );
        let label = format!("{}x{}", width, height);

        group.throughput(Throughput::Elements((width * height) as u64));
        group.bench_with_input(
            BenchmarkId::new("encode", &label),
            &image,
            |b, image| {
                b.iter(|| encode_sprite(black_box(image)).expect("Encoding failed"));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("decode", &label),
            &encoded,
            |b, encoded| {
                b.iter(|| decode_sprite(black_box(encoded), black_box(&entry)).expect("Decoding failed"));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, sprite_compaction);
criterion_main!(benches);
