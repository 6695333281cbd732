// In benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array3;

use texpatch::config::PatchConfig;
use texpatch::container::{pack, unpack};
use texpatch::filters::FilterKind;
use texpatch::pipeline::{apply_patch, create_patch};
use texpatch::types::{BitDepth, Image};

// --- Mock Data Generation ---

/// A deterministic, texture-like 8-bit RGBA image.
fn generate_texture(height: usize, width: usize, salt: usize) -> Image {
    let samples = Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
        ((y * 31 + x * 17 + c * 7 + salt) % 256) as u16
    });
    Image::new(samples, BitDepth::Eight).unwrap()
}

fn generate_maps(shape: (usize, usize, usize)) -> [Array3<bool>; 2] {
    [
        Array3::from_shape_fn(shape, |(y, x, _)| (y + x) % 3 != 0),
        Array3::from_shape_fn(shape, |(y, x, c)| (y * x + c) % 2 == 0),
    ]
}

// --- Benchmark Suite ---

const BENCH_SIDE: usize = 256;

fn bench_container(c: &mut Criterion) {
    let payload = generate_texture(BENCH_SIDE, BENCH_SIDE, 0);
    let maps = generate_maps(payload.dim());
    let container = pack(&payload, &maps).unwrap();

    let mut group = c.benchmark_group("Container Codec");
    group.throughput(criterion::Throughput::Elements(payload.samples().len() as u64));
    group.bench_function("pack 256x256 RGBA", |b| {
        b.iter(|| black_box(pack(black_box(&payload), black_box(&maps))))
    });
    group.bench_function("unpack 256x256 RGBA", |b| {
        b.iter(|| black_box(unpack(black_box(&container))))
    });
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let original = generate_texture(BENCH_SIDE, BENCH_SIDE, 1);
    let modified = generate_texture(BENCH_SIDE, BENCH_SIDE, 2);
    let config = PatchConfig::default();
    let filters = [FilterKind::RollHorizontal, FilterKind::RollVertical];
    let patch = create_patch(&original, &modified, &filters, &config).unwrap();

    let mut group = c.benchmark_group("Patch Pipeline");
    group.bench_function("create_patch (no filters)", |b| {
        b.iter(|| black_box(create_patch(&original, &modified, &[], &config)))
    });
    group.bench_function("create_patch (roll-h, roll-v)", |b| {
        b.iter(|| black_box(create_patch(&original, &modified, &filters, &config)))
    });
    group.bench_function("apply_patch (roll-h, roll-v)", |b| {
        b.iter(|| black_box(apply_patch(&original, &patch, &filters, &config)))
    });
    group.finish();
}

criterion_group!(benches, bench_container, bench_pipeline);
criterion_main!(benches);
