//! Streaming decoder/encoder cross-checked against the whole-buffer paths.

use log::info;
use purepng::prelude::*;
use purepng::FeedStatus;

fn gradient_image(width: u32, height: u32) -> Image {
	let header =
		Header::new(width, height, BitDepth::Eight, ColorType::GrayscaleAlpha, Interlace::None)
			.unwrap();
	let pixels: Vec<u8> =
		(0..header.pixel_buffer_len()).map(|i| (i % 249) as u8).collect();
	Image::new(header, pixels, None).unwrap()
}

#[test]
fn test_stream_decoder_matches_decode() {
	crate::init_logging();
	let image = gradient_image(21, 13);
	let bytes = encode(&image, &EncodeOptions::default()).unwrap();
	let whole = decode(&bytes).unwrap();

	for chunk_size in [1usize, 3, 7, 64, 4096] {
		let mut decoder = StreamDecoder::new();
		let mut status = FeedStatus::NeedMoreData;
		for piece in bytes.chunks(chunk_size) {
			status = decoder.feed(piece).unwrap();
		}
		assert_eq!(status, FeedStatus::RowsReady, "chunk size {chunk_size}");

		let streamed = decoder.finish().unwrap();
		assert_eq!(streamed.pixels(), whole.pixels());
		info!("stream decode matched at feed size {chunk_size}");
	}
}

#[test]
fn test_stream_decoder_row_drain_order() {
	let image = gradient_image(9, 6);
	let bytes = encode(&image, &EncodeOptions::default()).unwrap();

	let mut decoder = StreamDecoder::new();
	decoder.feed(&bytes).unwrap();

	let row_bytes = image.header().row_bytes();
	let mut row_index = 0;
	while let Some(row) = decoder.next_row() {
		assert_eq!(row, &image.pixels()[row_index * row_bytes..][..row_bytes]);
		row_index += 1;
	}
	assert_eq!(row_index, image.header().height() as usize);
}

#[test]
fn test_stream_decoder_header_early() {
	let image = gradient_image(5, 5);
	let bytes = encode(&image, &EncodeOptions::default()).unwrap();

	let mut decoder = StreamDecoder::new();
	// Signature plus the complete IHDR chunk
	decoder.feed(&bytes[..33]).unwrap();
	let header = decoder.header().expect("header after IHDR");
	assert_eq!(header.width(), 5);
	assert_eq!(header.height(), 5);
}

#[test]
fn test_stream_encoder_matches_encode_raw() {
	let header =
		Header::new(33, 17, BitDepth::Eight, ColorType::Rgb, Interlace::None).unwrap();
	let pixels: Vec<u8> = (0..header.pixel_buffer_len()).map(|i| (i * 11) as u8).collect();

	for level in [CompressionLevel::Store, CompressionLevel::Default, CompressionLevel::Best] {
		let options = EncodeOptions {
			compression_level: level,
			filter_strategy: FilterStrategy::Adaptive,
		};
		let whole = encode_raw(&header, &pixels, None, &options).unwrap();

		let mut encoder = StreamEncoder::new(Vec::new(), header, None, options).unwrap();
		for row in pixels.chunks(header.row_bytes()) {
			encoder.write_row(row).unwrap();
		}
		encoder.finish().unwrap();
		let streamed = encoder.into_inner();

		assert_eq!(streamed, whole, "streamed encode diverged at {level}");
	}
}

#[test]
fn test_stream_encoder_to_file_sink() {
	let header = Header::new(10, 10, BitDepth::Eight, ColorType::Grayscale, Interlace::None).unwrap();
	let pixels: Vec<u8> = (0..100u8).collect();
	let path = std::env::temp_dir().join(format!("purepng-stream-{}.png", std::process::id()));

	let file = std::fs::File::create(&path).unwrap();
	let mut encoder =
		StreamEncoder::new(std::io::BufWriter::new(file), header, None, EncodeOptions::default())
			.unwrap();
	for row in pixels.chunks(header.row_bytes()) {
		encoder.write_row(row).unwrap();
	}
	encoder.finish().unwrap();
	drop(encoder);

	let reloaded = Image::open(&path).unwrap();
	std::fs::remove_file(&path).ok();
	assert_eq!(reloaded.pixels(), pixels);
}

#[test]
fn test_stream_roundtrip_stream_to_stream() {
	let header =
		Header::new(14, 23, BitDepth::Sixteen, ColorType::Grayscale, Interlace::None).unwrap();
	let pixels: Vec<u8> = (0..header.pixel_buffer_len()).map(|i| (i ^ 0x5A) as u8).collect();

	let mut encoder =
		StreamEncoder::new(Vec::new(), header, None, EncodeOptions::default()).unwrap();
	for row in pixels.chunks(header.row_bytes()) {
		encoder.write_row(row).unwrap();
	}
	encoder.finish().unwrap();
	let bytes = encoder.into_inner();

	let mut decoder = StreamDecoder::new();
	decoder.feed(&bytes).unwrap();
	let image = decoder.finish().unwrap();
	assert_eq!(image.pixels(), pixels);
}
