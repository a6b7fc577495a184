use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use huffman_text::{HuffmanCodec, HuffmanTree};

fn generate_test_data(size: usize, alphabet: u8) -> Vec<u8> {
    // Skewed so low symbols dominate
    (0..size)
        .map(|i| {
            let x = (i as u64).wrapping_mul(2654435761) % 1000;
            ((x * x / 1000) % alphabet as u64) as u8
        })
        .collect()
}

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for &alphabet in &[4u8, 64, 255] {
        let data = generate_test_data(65536, alphabet);
        group.bench_with_input(BenchmarkId::new("from_bytes", alphabet), &data, |b, data| {
            b.iter(|| black_box(HuffmanTree::from_bytes(data).unwrap()));
        });
    }

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for &size in &[1024usize, 8192, 65536] {
        let data = generate_test_data(size, 64);
        let encoded = HuffmanCodec::new().encode_bytes(&data).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            let mut codec = HuffmanCodec::new();
            b.iter(|| black_box(codec.encode_bytes(data).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            let mut codec = HuffmanCodec::new();
            b.iter(|| black_box(codec.decode_bytes(encoded).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tree_build, bench_codec);
criterion_main!(benches);
