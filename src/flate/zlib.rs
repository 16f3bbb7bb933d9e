//! RFC 1950 zlib framing.
//!
//! A zlib stream is a 2-byte header, a deflate stream, and a big-endian
//! Adler-32 of the uncompressed data. The header's CMF byte carries the
//! method (always 8, deflate) and the base-2 log of the window size minus
//! eight; FLG carries a check value making `CMF * 256 + FLG` divisible by
//! 31, the FDICT preset-dictionary flag (rejected here), and a 2-bit
//! compression-level hint.

use crate::checksum::adler32;
use crate::error::FlateError;
use crate::flate::{CompressionLevel, deflate, inflate_partial};

/// CMF byte emitted by [`compress`]: method 8, 32 KiB window.
pub const CMF_DEFAULT: u8 = 0x78;

/// Wraps `data` in a zlib stream at the given compression level.
pub fn compress(data: &[u8], level: CompressionLevel) -> Vec<u8> {
	let cmf = CMF_DEFAULT;
	let mut flg = level.flevel() << 6;
	let remainder = (u16::from(cmf) * 256 + u16::from(flg)) % 31;
	if remainder != 0 {
		flg += (31 - remainder) as u8;
	}

	let mut out = Vec::with_capacity(data.len() / 2 + 16);
	out.push(cmf);
	out.push(flg);
	out.extend_from_slice(&deflate(data, level));
	out.extend_from_slice(&adler32(data).to_be_bytes());
	out
}

/// Unwraps and decompresses a zlib stream.
///
/// `size_limit` bounds (and pre-sizes) the decompressed output. The Adler-32
/// trailer is verified against the decompressed bytes.
pub fn decompress(data: &[u8], size_limit: usize) -> Result<Vec<u8>, FlateError> {
	if data.len() < 2 {
		return Err(FlateError::UnexpectedEndOfStream);
	}
	let cmf = data[0];
	let flg = data[1];

	let check = u16::from(cmf) * 256 + u16::from(flg);
	if check % 31 != 0 {
		return Err(FlateError::InvalidZlibChecksum(check));
	}
	if cmf & 0x0F != 8 || cmf >> 4 > 7 {
		return Err(FlateError::InvalidZlibHeader {
			cmf,
			flg,
		});
	}
	if flg & 0x20 != 0 {
		return Err(FlateError::DictNotSupported);
	}

	let (out, consumed) = inflate_partial(&data[2..], size_limit)?;

	let trailer_start = 2 + consumed;
	let Some(trailer) = data.get(trailer_start..trailer_start + 4) else {
		return Err(FlateError::UnexpectedEndOfStream);
	};
	let expected = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
	let actual = adler32(&out);
	if expected != actual {
		return Err(FlateError::AdlerMismatch {
			expected,
			actual,
		});
	}

	Ok(out)
}
