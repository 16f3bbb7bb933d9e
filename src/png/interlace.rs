//! Adam7 interlacing.
//!
//! Seven passes, each a sub-image sampled on its own origin/stride grid:
//!
//! | pass | x origin | y origin | x stride | y stride |
//! |------|----------|----------|----------|----------|
//! | 0    | 0        | 0        | 8        | 8        |
//! | 1    | 4        | 0        | 8        | 8        |
//! | 2    | 0        | 4        | 4        | 8        |
//! | 3    | 2        | 0        | 4        | 4        |
//! | 4    | 0        | 2        | 2        | 4        |
//! | 5    | 1        | 0        | 2        | 2        |
//! | 6    | 0        | 1        | 1        | 2        |
//!
//! Scatter places decoded pass pixels at their final image coordinates;
//! gather is the inverse, pulling image pixels into packed pass rows. For
//! sub-byte bit depths both directions move packed high-bit-first pixels,
//! relying on zero-initialized destinations for the OR-in writes.

use crate::png::{Header, Interlace};

/// Number of Adam7 passes.
pub const PASS_COUNT: usize = 7;

const X_ORIGIN: [u32; PASS_COUNT] = [0, 4, 0, 2, 0, 1, 0];
const Y_ORIGIN: [u32; PASS_COUNT] = [0, 0, 4, 0, 2, 0, 1];
const X_STRIDE: [u32; PASS_COUNT] = [8, 8, 4, 4, 2, 2, 1];
const Y_STRIDE: [u32; PASS_COUNT] = [8, 8, 8, 4, 4, 2, 2];

/// Width and height of one pass over a `width` x `height` image. Either may
/// be zero for small images.
pub fn pass_dimensions(pass: usize, width: u32, height: u32) -> (u32, u32) {
	let pass_width = if width > X_ORIGIN[pass] {
		(width - X_ORIGIN[pass]).div_ceil(X_STRIDE[pass])
	} else {
		0
	};
	let pass_height = if height > Y_ORIGIN[pass] {
		(height - Y_ORIGIN[pass]).div_ceil(Y_STRIDE[pass])
	} else {
		0
	};
	(pass_width, pass_height)
}

/// Total size of the filtered scanline stream for `header`: every row is
/// one selector byte plus its packed pixels, summed over the single image
/// or over all non-empty Adam7 passes.
pub fn raw_stream_len(header: &Header) -> usize {
	match header.interlace() {
		Interlace::None => header.height() as usize * (1 + header.row_bytes()),
		Interlace::Adam7 => {
			let mut total = 0;
			for pass in 0..PASS_COUNT {
				let (pass_width, pass_height) =
					pass_dimensions(pass, header.width(), header.height());
				if pass_width == 0 || pass_height == 0 {
					continue;
				}
				total += pass_height as usize * (1 + header.row_bytes_for_width(pass_width));
			}
			total
		}
	}
}

/// Reads packed pixel `x` from a row slice.
fn get_packed(row: &[u8], x: usize, bits: usize) -> u8 {
	let per_byte = 8 / bits;
	let shift = 8 - bits - (x % per_byte) * bits;
	(row[x / per_byte] >> shift) & ((1 << bits) - 1)
}

/// ORs packed pixel `x` into a zeroed row slice.
fn set_packed(row: &mut [u8], x: usize, bits: usize, value: u8) {
	let per_byte = 8 / bits;
	let shift = 8 - bits - (x % per_byte) * bits;
	row[x / per_byte] |= value << shift;
}

/// Scatters one decoded pass into the full image buffer.
///
/// `pass_rows` holds the pass's unfiltered packed rows; `image` must be
/// zero-initialized before the first pass when the format is sub-byte.
pub fn scatter_pass(pass: usize, pass_rows: &[u8], image: &mut [u8], header: &Header) {
	let (pass_width, pass_height) = pass_dimensions(pass, header.width(), header.height());
	if pass_width == 0 || pass_height == 0 {
		return;
	}
	let pass_row_bytes = header.row_bytes_for_width(pass_width);
	let image_row_bytes = header.row_bytes();
	let bits = header.bits_per_pixel();

	for pass_y in 0..pass_height as usize {
		let src_row = &pass_rows[pass_y * pass_row_bytes..][..pass_row_bytes];
		let image_y = (Y_ORIGIN[pass] + pass_y as u32 * Y_STRIDE[pass]) as usize;
		let dst_row = &mut image[image_y * image_row_bytes..][..image_row_bytes];

		for pass_x in 0..pass_width as usize {
			let image_x = (X_ORIGIN[pass] + pass_x as u32 * X_STRIDE[pass]) as usize;
			if bits >= 8 {
				let bytes = bits / 8;
				dst_row[image_x * bytes..][..bytes]
					.copy_from_slice(&src_row[pass_x * bytes..][..bytes]);
			} else {
				let value = get_packed(src_row, pass_x, bits);
				set_packed(dst_row, image_x, bits, value);
			}
		}
	}
}

/// Gathers one pass out of the full image buffer into packed pass rows.
pub fn gather_pass(pass: usize, image: &[u8], header: &Header) -> Vec<u8> {
	let (pass_width, pass_height) = pass_dimensions(pass, header.width(), header.height());
	if pass_width == 0 || pass_height == 0 {
		return Vec::new();
	}
	let pass_row_bytes = header.row_bytes_for_width(pass_width);
	let image_row_bytes = header.row_bytes();
	let bits = header.bits_per_pixel();

	let mut pass_rows = vec![0u8; pass_height as usize * pass_row_bytes];
	for pass_y in 0..pass_height as usize {
		let dst_row = &mut pass_rows[pass_y * pass_row_bytes..][..pass_row_bytes];
		let image_y = (Y_ORIGIN[pass] + pass_y as u32 * Y_STRIDE[pass]) as usize;
		let src_row = &image[image_y * image_row_bytes..][..image_row_bytes];

		for pass_x in 0..pass_width as usize {
			let image_x = (X_ORIGIN[pass] + pass_x as u32 * X_STRIDE[pass]) as usize;
			if bits >= 8 {
				let bytes = bits / 8;
				dst_row[pass_x * bytes..][..bytes]
					.copy_from_slice(&src_row[image_x * bytes..][..bytes]);
			} else {
				let value = get_packed(src_row, image_x, bits);
				set_packed(dst_row, pass_x, bits, value);
			}
		}
	}
	pass_rows
}
