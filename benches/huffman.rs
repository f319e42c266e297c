use criterion::{black_box, criterion_group, criterion_main, Criterion};
use huffpress::{compress, decompress, HuffmanCodec};
use lipsum::lipsum;

fn huffman_compression(c: &mut Criterion) {
    let input = lipsum(2048);
    let input = input.as_bytes();

    c.bench_function("huffman compression", |b| {
        b.iter(|| compress(black_box(input)).unwrap())
    });

    let random_input = (0..8192).map(|_| rand::random::<u8>()).collect::<Vec<u8>>();
    c.bench_function("huffman compression (random bytes)", |b| {
        b.iter(|| compress(black_box(&random_input)).unwrap())
    });
}

fn huffman_decompression(c: &mut Criterion) {
    let input = lipsum(4096);
    let compressed = compress(input.as_bytes()).unwrap();

    c.bench_function("huffman decompression", |b| {
        b.iter(|| decompress(black_box(&compressed)).unwrap())
    });
}

fn huffman_tree_construction(c: &mut Criterion) {
    let input = lipsum(4096);

    c.bench_function("huffman tree + code table", |b| {
        b.iter(|| HuffmanCodec::from_data(black_box(input.as_bytes())).unwrap())
    });
}

criterion_group!(
    benches,
    huffman_compression,
    huffman_decompression,
    huffman_tree_construction
);
criterion_main!(benches);
