//! Malformed-input behavior of the public decode entry points.

use purepng::prelude::*;
use purepng::png::chunk::{ChunkType, write_chunk};
use purepng::SIGNATURE;

fn valid_png() -> Vec<u8> {
	let header =
		Header::new(4, 4, BitDepth::Eight, ColorType::Grayscale, Interlace::None).unwrap();
	let pixels: Vec<u8> = (0..16u8).collect();
	let image = Image::new(header, pixels, None).unwrap();
	encode(&image, &EncodeOptions::default()).unwrap()
}

#[test]
fn test_empty_input() {
	assert!(matches!(decode(&[]), Err(PngError::InvalidSignature)));
}

#[test]
fn test_signature_flipped_bit() {
	let mut bytes = valid_png();
	bytes[1] ^= 0x20;
	assert!(matches!(decode(&bytes), Err(PngError::InvalidSignature)));
}

#[test]
fn test_corrupted_ihdr_crc() {
	let mut bytes = valid_png();
	// Last CRC byte of the IHDR chunk, at signature + 25 - 1
	bytes[32] ^= 0xFF;
	assert!(matches!(decode(&bytes), Err(PngError::InvalidChunkCrc { .. })));
}

#[test]
fn test_corrupted_idat_payload() {
	let mut bytes = valid_png();
	// Flip a byte in the middle of the first IDAT payload; either the CRC
	// or (if the flip lands elsewhere) the zlib layer must catch it
	let idat_offset = 8 + 25 + 8;
	bytes[idat_offset + 4] ^= 0xFF;
	assert!(decode(&bytes).is_err());
}

#[test]
fn test_truncation_everywhere() {
	let bytes = valid_png();
	for keep in 0..bytes.len() {
		assert!(
			decode(&bytes[..keep]).is_err(),
			"a {keep}-byte prefix decoded successfully"
		);
	}
}

#[test]
fn test_zlib_adler_corruption_surfaces() {
	let header =
		Header::new(2, 2, BitDepth::Eight, ColorType::Grayscale, Interlace::None).unwrap();
	let raw = [0u8, 1, 2, 0, 3, 4]; // two None-filtered rows
	let mut idat = purepng::flate::zlib::compress(&raw, CompressionLevel::Default);
	let last = idat.len() - 1;
	idat[last] ^= 0xFF;

	let mut bytes = Vec::new();
	bytes.extend_from_slice(&SIGNATURE);
	write_chunk(&mut bytes, ChunkType::IHDR, &header.to_bytes());
	write_chunk(&mut bytes, ChunkType::IDAT, &idat);
	write_chunk(&mut bytes, ChunkType::IEND, &[]);

	assert!(matches!(
		decode(&bytes),
		Err(PngError::Flate(FlateError::AdlerMismatch { .. }))
	));
}

#[test]
fn test_oversized_width_in_ihdr() {
	// Hand-build an IHDR payload with the top bit of width set
	let mut payload = [0u8; 13];
	payload[0..4].copy_from_slice(&0x8000_0001u32.to_be_bytes());
	payload[4..8].copy_from_slice(&1u32.to_be_bytes());
	payload[8] = 8; // bit depth
	payload[9] = 0; // grayscale
	payload[12] = 0;

	let mut bytes = Vec::new();
	bytes.extend_from_slice(&SIGNATURE);
	write_chunk(&mut bytes, ChunkType::IHDR, &payload);
	write_chunk(&mut bytes, ChunkType::IEND, &[]);

	assert!(matches!(decode(&bytes), Err(PngError::InvalidWidth(0x8000_0001))));
}

#[test]
fn test_bad_color_depth_combo_in_ihdr() {
	let mut payload = [0u8; 13];
	payload[0..4].copy_from_slice(&2u32.to_be_bytes());
	payload[4..8].copy_from_slice(&2u32.to_be_bytes());
	payload[8] = 4; // 4-bit
	payload[9] = 2; // RGB, which requires 8 or 16

	let mut bytes = Vec::new();
	bytes.extend_from_slice(&SIGNATURE);
	write_chunk(&mut bytes, ChunkType::IHDR, &payload);
	write_chunk(&mut bytes, ChunkType::IEND, &[]);

	assert!(matches!(
		decode(&bytes),
		Err(PngError::InvalidColorBitDepthCombo { color_type: 2, bit_depth: 4 })
	));
}

#[test]
fn test_nonzero_compression_method() {
	let mut payload = [0u8; 13];
	payload[0..4].copy_from_slice(&1u32.to_be_bytes());
	payload[4..8].copy_from_slice(&1u32.to_be_bytes());
	payload[8] = 8;
	payload[9] = 0;
	payload[10] = 1; // only method 0 exists

	let mut bytes = Vec::new();
	bytes.extend_from_slice(&SIGNATURE);
	write_chunk(&mut bytes, ChunkType::IHDR, &payload);
	write_chunk(&mut bytes, ChunkType::IEND, &[]);

	assert!(matches!(decode(&bytes), Err(PngError::InvalidCompressionMethod(1))));
}

#[test]
fn test_bad_palette_length() {
	let header =
		Header::new(2, 2, BitDepth::Eight, ColorType::Indexed, Interlace::None).unwrap();
	let raw = [0u8, 0, 0, 0, 0, 0];
	let idat = purepng::flate::zlib::compress(&raw, CompressionLevel::Default);

	let mut bytes = Vec::new();
	bytes.extend_from_slice(&SIGNATURE);
	write_chunk(&mut bytes, ChunkType::IHDR, &header.to_bytes());
	write_chunk(&mut bytes, ChunkType::PLTE, &[1, 2, 3, 4]); // not a multiple of 3
	write_chunk(&mut bytes, ChunkType::IDAT, &idat);
	write_chunk(&mut bytes, ChunkType::IEND, &[]);

	assert!(matches!(decode(&bytes), Err(PngError::InvalidPaletteSize(4))));
}
