//! Whole-image roundtrips through the public API.

use log::info;
use purepng::prelude::*;

fn checkerboard_rgb(width: u32, height: u32) -> Image {
	let header = Header::new(width, height, BitDepth::Eight, ColorType::Rgb, Interlace::None)
		.expect("valid header");
	let mut pixels = Vec::with_capacity(header.pixel_buffer_len());
	for y in 0..height {
		for x in 0..width {
			if (x + y) % 2 == 0 {
				pixels.extend_from_slice(&[255, 255, 255]);
			} else {
				pixels.extend_from_slice(&[0, 0, 0]);
			}
		}
	}
	Image::new(header, pixels, None).expect("valid image")
}

#[test]
fn test_roundtrip_all_levels() {
	crate::init_logging();
	let image = checkerboard_rgb(32, 32);
	for level in [
		CompressionLevel::Store,
		CompressionLevel::Fastest,
		CompressionLevel::Fast,
		CompressionLevel::Default,
		CompressionLevel::Best,
	] {
		let options = EncodeOptions {
			compression_level: level,
			filter_strategy: FilterStrategy::Adaptive,
		};
		let bytes = encode(&image, &options).unwrap();
		info!("32x32 RGB checkerboard at {level}: {} bytes", bytes.len());
		assert!(bytes.len() <= max_encoded_size(image.header()).unwrap());

		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.pixels(), image.pixels());
	}
}

#[test]
fn test_roundtrip_gradient_every_filter() {
	let header =
		Header::new(64, 64, BitDepth::Eight, ColorType::Grayscale, Interlace::None).unwrap();
	let pixels: Vec<u8> = (0..header.pixel_buffer_len()).map(|i| ((i / 64) + (i % 64)) as u8).collect();
	let image = Image::new(header, pixels, None).unwrap();

	for strategy in [
		FilterStrategy::None,
		FilterStrategy::Sub,
		FilterStrategy::Up,
		FilterStrategy::Average,
		FilterStrategy::Paeth,
		FilterStrategy::Adaptive,
	] {
		let options = EncodeOptions {
			compression_level: CompressionLevel::Default,
			filter_strategy: strategy,
		};
		let bytes = encode(&image, &options).unwrap();
		let decoded = decode(&bytes).unwrap();
		assert_eq!(decoded.pixels(), image.pixels(), "strategy {strategy:?}");
	}
}

#[test]
fn test_encode_raw_matches_encode() {
	let image = checkerboard_rgb(8, 8);
	let options = EncodeOptions::default();
	let from_image = encode(&image, &options).unwrap();
	let from_raw = encode_raw(image.header(), image.pixels(), None, &options).unwrap();
	assert_eq!(from_image, from_raw);
}

#[test]
fn test_save_and_open() {
	crate::init_logging();
	let image = checkerboard_rgb(16, 16);
	let path =
		std::env::temp_dir().join(format!("purepng-roundtrip-{}.png", std::process::id()));

	image.save(&path).unwrap();
	let reloaded = Image::open(&path).unwrap();
	std::fs::remove_file(&path).ok();

	assert_eq!(reloaded.header(), image.header());
	assert_eq!(reloaded.pixels(), image.pixels());
}

#[test]
fn test_signature_constant() {
	let image = checkerboard_rgb(2, 2);
	let bytes = encode(&image, &EncodeOptions::default()).unwrap();
	assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[test]
fn test_indexed_palette_survives() {
	let header = Header::new(3, 3, BitDepth::Four, ColorType::Indexed, Interlace::None).unwrap();
	let palette = Palette::from_entries(vec![
		PaletteEntry::new(10, 20, 30),
		PaletteEntry::new(40, 50, 60),
		PaletteEntry::new(70, 80, 90),
	])
	.unwrap();
	// Three 4-bit pixels per row pack into two bytes, low nibble padded
	let pixels = vec![0x01, 0x20, 0x12, 0x00, 0x20, 0x10];
	let image = Image::new(header, pixels, Some(palette.clone())).unwrap();

	let bytes = encode(&image, &EncodeOptions::default()).unwrap();
	let decoded = decode(&bytes).unwrap();
	assert_eq!(decoded.palette(), Some(&palette));
	assert_eq!(decoded.pixels(), image.pixels());
}
