//! Benchmark suite for the PNG codec
//!
//! Measures the checksum primitives, the deflate engine, and the full
//! encode/decode pipeline on synthetic images.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use purepng::checksum::{adler32, crc32};
use purepng::flate::{CompressionLevel, deflate, inflate};
use purepng::prelude::*;
use purepng_benches::{generate_gradient, generate_indexed, generate_noise, sizes};
use std::hint::black_box;

/// Benchmark the checksum primitives on a 1 MiB buffer
fn bench_checksums(c: &mut Criterion) {
	let data: Vec<u8> = (0..1_048_576usize).map(|i| (i * 31) as u8).collect();

	let mut group = c.benchmark_group("checksum");
	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("crc32", |b| b.iter(|| crc32(black_box(&data))));
	group.bench_function("adler32", |b| b.iter(|| adler32(black_box(&data))));
	group.finish();
}

/// Benchmark raw deflate compression at every level
fn bench_deflate_levels(c: &mut Criterion) {
	// Filtered scanlines of a gradient image approximate the codec's
	// real deflate input
	let image = generate_gradient(sizes::SMALL.0, sizes::SMALL.1);
	let data = image.pixels().to_vec();

	let mut group = c.benchmark_group("deflate");
	group.throughput(Throughput::Bytes(data.len() as u64));
	for level in [
		CompressionLevel::Store,
		CompressionLevel::Fastest,
		CompressionLevel::Fast,
		CompressionLevel::Default,
		CompressionLevel::Best,
	] {
		group.bench_with_input(BenchmarkId::new("compress", level), &data, |b, data| {
			b.iter(|| deflate(black_box(data), level));
		});
	}
	group.finish();
}

/// Benchmark inflate on a pre-compressed buffer
fn bench_inflate(c: &mut Criterion) {
	let image = generate_gradient(sizes::MEDIUM.0, sizes::MEDIUM.1);
	let data = image.pixels().to_vec();
	let compressed = deflate(&data, CompressionLevel::Default);

	let mut group = c.benchmark_group("inflate");
	group.throughput(Throughput::Bytes(data.len() as u64));
	group.bench_function("decompress", |b| {
		b.iter(|| inflate(black_box(&compressed), data.len()).unwrap());
	});
	group.finish();
}

/// Benchmark the whole encode pipeline per image profile
fn bench_encode(c: &mut Criterion) {
	let images = [
		("gradient", generate_gradient(sizes::SMALL.0, sizes::SMALL.1)),
		("noise", generate_noise(sizes::SMALL.0, sizes::SMALL.1)),
		("indexed", generate_indexed(sizes::SMALL.0, sizes::SMALL.1)),
	];

	let mut group = c.benchmark_group("encode");
	for (name, image) in &images {
		let pixels = u64::from(image.header().width()) * u64::from(image.header().height());
		group.throughput(Throughput::Elements(pixels));
		group.bench_with_input(BenchmarkId::new("adaptive", name), image, |b, image| {
			b.iter(|| encode(black_box(image), &EncodeOptions::default()).unwrap());
		});
	}
	group.finish();
}

/// Benchmark the whole decode pipeline per image profile
fn bench_decode(c: &mut Criterion) {
	let encoded = [
		("gradient", encode(&generate_gradient(sizes::MEDIUM.0, sizes::MEDIUM.1), &EncodeOptions::default()).unwrap()),
		("noise", encode(&generate_noise(sizes::SMALL.0, sizes::SMALL.1), &EncodeOptions::default()).unwrap()),
	];

	let mut group = c.benchmark_group("decode");
	for (name, bytes) in &encoded {
		group.throughput(Throughput::Bytes(bytes.len() as u64));
		group.bench_with_input(BenchmarkId::new("full_pipeline", name), bytes, |b, bytes| {
			b.iter(|| decode(black_box(bytes)).unwrap());
		});
	}
	group.finish();
}

criterion_group!(
	benches,
	bench_checksums,
	bench_deflate_levels,
	bench_inflate,
	bench_encode,
	bench_decode,
);

criterion_main!(benches);
