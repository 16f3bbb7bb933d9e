//! Whole-buffer PNG decoding.
//!
//! Pipeline: signature check, chunk walk (IHDR first, PLTE rules, contiguous
//! IDAT, IEND last), zlib decompression of the collected IDAT payload sized
//! exactly from the header, per-scanline unfiltering, and - for interlaced
//! images - the Adam7 scatter into the final pixel buffer.
//!
//! Bytes after the IEND chunk are ignored rather than rejected.

use crate::error::PngError;
use crate::flate::zlib;
use crate::png::chunk::{ChunkReader, ChunkType};
use crate::png::filter::{self, FilterType};
use crate::png::interlace;
use crate::png::{ColorType, Header, Image, Interlace, Palette, SIGNATURE};

/// Decodes a complete PNG file.
pub fn decode(data: &[u8]) -> Result<Image, PngError> {
	if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
		return Err(PngError::InvalidSignature);
	}

	let parsed = parse_chunks(&data[SIGNATURE.len()..])?;
	let header = parsed.header;

	let raw_len = interlace::raw_stream_len(&header);
	let raw = zlib::decompress(&parsed.idat, raw_len)?;
	if raw.len() != raw_len {
		return Err(crate::error::FlateError::UnexpectedEndOfStream.into());
	}

	let pixels = unfilter_image(&header, &raw)?;
	Image::new(header, pixels, parsed.palette)
}

pub(crate) struct ParsedChunks {
	pub(crate) header: Header,
	pub(crate) palette: Option<Palette>,
	pub(crate) idat: Vec<u8>,
}

/// Walks the chunk stream after the signature, enforcing ordering rules and
/// collecting the IDAT payload.
pub(crate) fn parse_chunks(data: &[u8]) -> Result<ParsedChunks, PngError> {
	let mut reader = ChunkReader::new(data);
	let mut header: Option<Header> = None;
	let mut palette: Option<Palette> = None;
	let mut idat = Vec::new();
	let mut seen_idat = false;
	let mut idat_closed = false;
	let mut seen_iend = false;

	while let Some(chunk) = reader.next_chunk()? {
		if header.is_none() && chunk.chunk_type() != ChunkType::IHDR {
			return Err(PngError::MissingIhdr);
		}
		match chunk.chunk_type() {
			ChunkType::IHDR => {
				if header.is_some() {
					return Err(PngError::DuplicateIhdr);
				}
				header = Some(Header::from_bytes(chunk.data())?);
			}
			ChunkType::PLTE => {
				let Some(hdr) = header.as_ref() else {
					return Err(PngError::MissingIhdr);
				};
				if seen_idat {
					return Err(PngError::PlteAfterIdat);
				}
				if palette.is_some() {
					return Err(PngError::ChunkOrderViolation("duplicate PLTE chunk"));
				}
				if matches!(hdr.color_type(), ColorType::Grayscale | ColorType::GrayscaleAlpha) {
					return Err(PngError::PlteForNonIndexed);
				}
				palette = Some(Palette::from_bytes(chunk.data())?);
			}
			ChunkType::IDAT => {
				if idat_closed {
					return Err(PngError::ChunkOrderViolation("IDAT chunks must be contiguous"));
				}
				seen_idat = true;
				idat.extend_from_slice(chunk.data());
			}
			ChunkType::IEND => {
				seen_iend = true;
				// Anything after IEND is deliberately ignored
				break;
			}
			_ => {
				// Unknown chunk, CRC already validated: skip it
				if seen_idat {
					idat_closed = true;
				}
			}
		}
	}

	let Some(header) = header else {
		return Err(PngError::MissingIhdr);
	};
	if !seen_iend {
		return Err(PngError::MissingIend);
	}
	if !seen_idat {
		return Err(PngError::MissingIdat);
	}
	if header.color_type() == ColorType::Indexed && palette.is_none() {
		return Err(PngError::MissingPlteForIndexed);
	}

	Ok(ParsedChunks {
		header,
		palette,
		idat,
	})
}

/// Allocates the pixel buffer, surfacing allocation failure as a PNG error.
pub(crate) fn alloc_pixel_buffer(len: usize) -> Result<Vec<u8>, PngError> {
	let mut pixels = Vec::new();
	pixels.try_reserve_exact(len).map_err(|_| PngError::OutOfMemory {
		requested: len,
	})?;
	pixels.resize(len, 0);
	Ok(pixels)
}

/// Unfilters the raw scanline stream into the packed pixel buffer.
fn unfilter_image(header: &Header, raw: &[u8]) -> Result<Vec<u8>, PngError> {
	let mut pixels = alloc_pixel_buffer(header.pixel_buffer_len())?;

	match header.interlace() {
		Interlace::None => {
			unfilter_rows(header, raw, header.row_bytes(), header.height(), &mut pixels)?;
		}
		Interlace::Adam7 => {
			let mut offset = 0;
			for pass in 0..interlace::PASS_COUNT {
				let (pass_width, pass_height) =
					interlace::pass_dimensions(pass, header.width(), header.height());
				if pass_width == 0 || pass_height == 0 {
					continue;
				}
				let pass_row_bytes = header.row_bytes_for_width(pass_width);
				let pass_len = pass_height as usize * (1 + pass_row_bytes);
				let mut pass_rows = alloc_pixel_buffer(pass_height as usize * pass_row_bytes)?;
				unfilter_rows(
					header,
					&raw[offset..offset + pass_len],
					pass_row_bytes,
					pass_height,
					&mut pass_rows,
				)?;
				interlace::scatter_pass(pass, &pass_rows, &mut pixels, header);
				offset += pass_len;
			}
		}
	}

	Ok(pixels)
}

/// Unfilters `height` scanlines of `row_bytes` bytes each from `raw`
/// (selector byte plus row data per scanline) into `out`.
pub(crate) fn unfilter_rows(
	header: &Header,
	raw: &[u8],
	row_bytes: usize,
	height: u32,
	out: &mut [u8],
) -> Result<(), PngError> {
	let unit = header.filter_unit();
	for y in 0..height as usize {
		let line = &raw[y * (1 + row_bytes)..][..1 + row_bytes];
		let filter = FilterType::from_u8(line[0])?;

		let (done, rest) = out.split_at_mut(y * row_bytes);
		let row = &mut rest[..row_bytes];
		row.copy_from_slice(&line[1..]);

		let prev = if y > 0 {
			Some(&done[(y - 1) * row_bytes..])
		} else {
			None
		};
		filter::unfilter_row(filter, row, prev, unit);
	}
	Ok(())
}
