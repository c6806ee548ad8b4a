use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rct_objdata::{decode_chunk_bytes, encode_chunk, ChunkEncoding, ChunkHeader};
use std::hint::black_box;
use std::time::Duration;

fn generate_test_data(size: usize, pattern: &str) -> Vec<u8> {
    match pattern {
        "sprite" => {
            // Long transparent runs broken by short opaque spans
            (0..size)
                .map(|i| if i % 64 < 40 { 0 } else { (i % 7 + 10) as u8 })
                .collect()
        }
        "repetitive" => {
            let pattern = b"ABCDEFGH";
            pattern.iter().copied().cycle().take(size).collect()
        }
        "random" => (0..size)
            .map(|i| {
                let x = i as u32;
                ((x.wrapping_mul(1664525).wrapping_add(1013904223)) >> 13) as u8
            })
            .collect(),
        _ => panic!("Unknown pattern: {}", pattern),
    }
}

const ENCODINGS: [ChunkEncoding; 4] = [
    ChunkEncoding::Raw,
    ChunkEncoding::Rle,
    ChunkEncoding::RleCompressed,
    ChunkEncoding::Rotate,
];

fn encode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_encode");
    group.measurement_time(Duration::from_secs(5));

    for size in [1024, 65536].iter() {
        for pattern in ["sprite", "repetitive", "random"].iter() {
            let data = generate_test_data(*size, pattern);

            for encoding in ENCODINGS {
                let benchmark_id = BenchmarkId::from_parameter(format!(
                    "{}/{}/{}",
                    size,
                    pattern,
                    encoding.name()
                ));

                group.throughput(Throughput::Bytes(*size as u64));
                group.bench_with_input(benchmark_id, &data, |b, data| {
                    b.iter(|| {
                        let mut header = ChunkHeader::new(encoding);
                        encode_chunk(black_box(data), &mut header)
                    });
                });
            }
        }
    }

    group.finish();
}

fn decode_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("chunk_decode");
    group.measurement_time(Duration::from_secs(5));

    for size in [1024, 65536].iter() {
        for pattern in ["sprite", "repetitive", "random"].iter() {
            let data = generate_test_data(*size, pattern);

            for encoding in ENCODINGS {
                let mut header = ChunkHeader::new(encoding);
                let encoded = encode_chunk(&data, &mut header);

                let benchmark_id = BenchmarkId::from_parameter(format!(
                    "{}/{}/{}",
                    size,
                    pattern,
                    encoding.name()
                ));

                group.throughput(Throughput::Bytes(*size as u64));
                group.bench_with_input(benchmark_id, &encoded, |b, encoded| {
                    b.iter(|| {
                        decode_chunk_bytes(black_box(encoded), black_box(&header))
                            .expect("Decoding failed")
                    });
                });
            }
        }
    }

    group.finish();
}

criterion_group!(benches, encode_throughput, decode_throughput);
criterion_main!(benches);
