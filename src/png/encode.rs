//! Whole-buffer PNG encoding.
//!
//! The reverse of the decode pipeline: (optional Adam7 gather), per-scanline
//! filtering with the configured strategy, zlib compression at the
//! configured level, and chunk emission - signature, IHDR, PLTE when a
//! palette is present, IDAT in segments of at most 32 KiB, IEND.

use crate::error::PngError;
use crate::flate::{CompressionLevel, zlib};
use crate::png::chunk::{ChunkType, write_chunk};
use crate::png::filter::{FilterStrategy, apply_filter};
use crate::png::interlace;
use crate::png::{ColorType, Header, Image, Interlace, Palette, SIGNATURE};

/// Largest IDAT payload emitted per chunk.
pub const IDAT_SEGMENT_SIZE: usize = 32_768;

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
	/// Deflate effort level.
	pub compression_level: CompressionLevel,
	/// Scanline filter strategy.
	pub filter_strategy: FilterStrategy,
}

/// Encodes an image into a fresh byte vector.
pub fn encode(image: &Image, options: &EncodeOptions) -> Result<Vec<u8>, PngError> {
	let mut out = Vec::new();
	encode_into(image, options, &mut out)?;
	Ok(out)
}

/// Encodes an image, appending to `out`. Returns the bytes written.
pub fn encode_into(
	image: &Image,
	options: &EncodeOptions,
	out: &mut Vec<u8>,
) -> Result<usize, PngError> {
	encode_raw_into(image.header(), image.pixels(), image.palette(), options, out)
}

/// Encodes raw pixel data under `header` into a fresh byte vector.
pub fn encode_raw(
	header: &Header,
	pixels: &[u8],
	palette: Option<&Palette>,
	options: &EncodeOptions,
) -> Result<Vec<u8>, PngError> {
	let mut out = Vec::new();
	encode_raw_into(header, pixels, palette, options, &mut out)?;
	Ok(out)
}

/// Encodes raw pixel data, appending to `out`. Returns the bytes written.
pub fn encode_raw_into(
	header: &Header,
	pixels: &[u8],
	palette: Option<&Palette>,
	options: &EncodeOptions,
	out: &mut Vec<u8>,
) -> Result<usize, PngError> {
	let expected = header.pixel_buffer_len();
	if pixels.len() != expected {
		return Err(PngError::BufferSizeMismatch {
			expected,
			actual: pixels.len(),
		});
	}
	match header.color_type() {
		ColorType::Indexed if palette.is_none() => return Err(PngError::MissingPlteForIndexed),
		ColorType::Grayscale | ColorType::GrayscaleAlpha if palette.is_some() => {
			return Err(PngError::PlteForNonIndexed);
		}
		_ => {}
	}

	let raw = filter_image(header, pixels, options.filter_strategy);
	let compressed = zlib::compress(&raw, options.compression_level);

	let start = out.len();
	out.extend_from_slice(&SIGNATURE);
	write_chunk(out, ChunkType::IHDR, &header.to_bytes());
	if let Some(palette) = palette {
		write_chunk(out, ChunkType::PLTE, &palette.to_bytes());
	}
	for segment in compressed.chunks(IDAT_SEGMENT_SIZE) {
		write_chunk(out, ChunkType::IDAT, segment);
	}
	write_chunk(out, ChunkType::IEND, &[]);
	Ok(out.len() - start)
}

/// Produces the filtered scanline stream (selector byte + filtered row per
/// scanline), gathering Adam7 passes first when the header is interlaced.
fn filter_image(header: &Header, pixels: &[u8], strategy: FilterStrategy) -> Vec<u8> {
	let row_bytes = header.row_bytes();
	let mut raw = Vec::with_capacity(interlace::raw_stream_len(header));
	// One row of scratch and one of output, reused across every row
	let mut scratch = vec![0u8; row_bytes];
	let mut filtered = vec![0u8; row_bytes];

	match header.interlace() {
		Interlace::None => {
			filter_rows(header, pixels, row_bytes, strategy, &mut scratch, &mut filtered, &mut raw);
		}
		Interlace::Adam7 => {
			for pass in 0..interlace::PASS_COUNT {
				let (pass_width, pass_height) =
					interlace::pass_dimensions(pass, header.width(), header.height());
				if pass_width == 0 || pass_height == 0 {
					continue;
				}
				let pass_rows = interlace::gather_pass(pass, pixels, header);
				let pass_row_bytes = header.row_bytes_for_width(pass_width);
				filter_rows(
					header,
					&pass_rows,
					pass_row_bytes,
					strategy,
					&mut scratch,
					&mut filtered,
					&mut raw,
				);
			}
		}
	}

	raw
}

/// Filters consecutive `row_bytes`-sized rows of `rows`, appending selector
/// and filtered bytes to `raw`. Each call starts a fresh predecessor chain,
/// which is exactly the per-pass independence Adam7 requires.
fn filter_rows(
	header: &Header,
	rows: &[u8],
	row_bytes: usize,
	strategy: FilterStrategy,
	scratch: &mut [u8],
	filtered: &mut [u8],
	raw: &mut Vec<u8>,
) {
	let unit = header.filter_unit();
	let height = rows.len() / row_bytes;
	for y in 0..height {
		let row = &rows[y * row_bytes..][..row_bytes];
		let prev = if y > 0 {
			Some(&rows[(y - 1) * row_bytes..][..row_bytes])
		} else {
			None
		};
		let chosen = apply_filter(
			strategy,
			row,
			prev,
			unit,
			&mut scratch[..row_bytes],
			&mut filtered[..row_bytes],
		);
		raw.push(chosen as u8);
		raw.extend_from_slice(&filtered[..row_bytes]);
	}
}

/// Upper bound on the encoded size of an image with this header.
///
/// Accounts for the signature, IHDR, a maximal PLTE, per-IDAT chunk
/// overhead, and the worst case of an incompressible deflate payload
/// (stored blocks plus their headers). Fails with
/// [`PngError::SizeOverflow`] when the arithmetic cannot be carried out in
/// `usize`.
pub fn max_encoded_size(header: &Header) -> Result<usize, PngError> {
	let bits = header.bits_per_pixel() as u64;
	let row_bytes = |width: u64| (width * bits).div_ceil(8);

	// Exact size of the filtered scanline stream, selector bytes included
	let raw: u64 = match header.interlace() {
		Interlace::None => {
			u64::from(header.height()) * (1 + row_bytes(u64::from(header.width())))
		}
		Interlace::Adam7 => (0..interlace::PASS_COUNT)
			.map(|pass| {
				let (pass_width, pass_height) =
					interlace::pass_dimensions(pass, header.width(), header.height());
				if pass_width == 0 || pass_height == 0 {
					0
				} else {
					u64::from(pass_height) * (1 + row_bytes(u64::from(pass_width)))
				}
			})
			.sum(),
	};

	// Stored deflate: 5 bytes of block header per 65535-byte block, plus the
	// 2-byte zlib header and 4-byte trailer
	let zlib_len = raw + (raw / 65_535 + 1) * 5 + 6;

	// 12 bytes of chunk overhead per IDAT segment
	let idat_overhead = (zlib_len / IDAT_SEGMENT_SIZE as u64 + 1) * 12;

	let fixed = (SIGNATURE.len() + (12 + Header::SIZE) + (12 + 768) + 12) as u64;
	usize::try_from(zlib_len + idat_overhead + fixed).map_err(|_| PngError::SizeOverflow)
}
