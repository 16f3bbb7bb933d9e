//! Benchmark helper utilities for purepng
//!
//! This module provides generators for synthetic test images with different
//! compressibility profiles, so the benchmarks exercise the codec on
//! realistic workloads without shipping binary fixtures.

use purepng::prelude::*;

/// Generates a grayscale image with a smooth gradient, the friendliest case
/// for the scanline filters and LZ77.
pub fn generate_gradient(width: u32, height: u32) -> Image {
	let header = Header::new(width, height, BitDepth::Eight, ColorType::Grayscale, Interlace::None)
		.expect("valid benchmark dimensions");
	let mut pixels = Vec::with_capacity(header.pixel_buffer_len());
	for y in 0..height {
		for x in 0..width {
			pixels.push(((x + y) & 0xFF) as u8);
		}
	}
	Image::new(header, pixels, None).expect("valid benchmark image")
}

/// Generates an RGB image of pseudorandom noise, the adversarial case where
/// filtering and matching find nothing to exploit.
pub fn generate_noise(width: u32, height: u32) -> Image {
	let header = Header::new(width, height, BitDepth::Eight, ColorType::Rgb, Interlace::None)
		.expect("valid benchmark dimensions");
	let mut state = 0x2545_F491u32;
	let pixels = (0..header.pixel_buffer_len())
		.map(|_| {
			// xorshift keeps the generator dependency-free
			state ^= state << 13;
			state ^= state >> 17;
			state ^= state << 5;
			(state >> 24) as u8
		})
		.collect();
	Image::new(header, pixels, None).expect("valid benchmark image")
}

/// Generates a dithered 2-color indexed image, heavy on short LZ77 runs.
pub fn generate_indexed(width: u32, height: u32) -> Image {
	let header = Header::new(width, height, BitDepth::Eight, ColorType::Indexed, Interlace::None)
		.expect("valid benchmark dimensions");
	let palette = Palette::from_entries(vec![
		PaletteEntry::new(0, 0, 0),
		PaletteEntry::new(255, 255, 255),
	])
	.expect("valid palette");
	let mut pixels = Vec::with_capacity(header.pixel_buffer_len());
	for y in 0..height {
		for x in 0..width {
			pixels.push(((x / 3 + y / 2) % 2) as u8);
		}
	}
	Image::new(header, pixels, Some(palette)).expect("valid benchmark image")
}

/// Common benchmark sizes.
pub mod sizes {
	/// Tiny image: 64x64 (4,096 pixels)
	pub const TINY: (u32, u32) = (64, 64);
	/// Small image: 256x256 (65,536 pixels)
	pub const SMALL: (u32, u32) = (256, 256);
	/// Medium image: 512x512 (262,144 pixels)
	pub const MEDIUM: (u32, u32) = (512, 512);
	/// Large image: 1024x768 (786,432 pixels)
	pub const LARGE: (u32, u32) = (1024, 768);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generators_roundtrip() {
		for image in [generate_gradient(32, 32), generate_noise(16, 16), generate_indexed(24, 24)]
		{
			let bytes = encode(&image, &EncodeOptions::default()).unwrap();
			let decoded = decode(&bytes).unwrap();
			assert_eq!(decoded.pixels(), image.pixels());
		}
	}

	#[test]
	fn test_sizes_constants() {
		assert_eq!(sizes::TINY, (64, 64));
		assert_eq!(sizes::LARGE, (1024, 768));
	}
}
