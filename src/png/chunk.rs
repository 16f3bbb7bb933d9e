//! PNG chunk stream reading and writing.
//!
//! Every chunk is `length (BE u32) | type (4 ASCII letters) | data | CRC-32`
//! with the CRC computed over type and data. The case of each type letter
//! encodes a property bit (upper case = 0): ancillary, private, reserved,
//! and safe-to-copy.
//!
//! [`ChunkReader`] validates each chunk in order. A CRC mismatch on a
//! critical chunk is fatal; a mismatched ancillary chunk is silently
//! skipped, never surfaced to the caller.

use crate::checksum::Crc32;
use crate::error::PngError;

/// Largest legal chunk payload, 2^31 - 1 bytes.
pub const MAX_CHUNK_DATA: u32 = 0x7FFF_FFFF;

/// A four-letter chunk type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
	/// Image header, always first.
	pub const IHDR: ChunkType = ChunkType(*b"IHDR");
	/// Palette.
	pub const PLTE: ChunkType = ChunkType(*b"PLTE");
	/// Image data.
	pub const IDAT: ChunkType = ChunkType(*b"IDAT");
	/// Stream terminator, always last.
	pub const IEND: ChunkType = ChunkType(*b"IEND");

	/// Whether all four bytes are ASCII letters.
	pub fn is_valid(self) -> bool {
		self.0.iter().all(u8::is_ascii_alphabetic)
	}

	/// Critical chunks (first letter upper case) must be understood.
	pub fn is_critical(self) -> bool {
		self.0[0] & 0x20 == 0
	}

	/// Ancillary chunks may be skipped.
	pub fn is_ancillary(self) -> bool {
		!self.is_critical()
	}

	/// Public chunk types are registered by the standard.
	pub fn is_public(self) -> bool {
		self.0[1] & 0x20 == 0
	}

	/// The reserved property bit, 0 in conforming streams.
	pub fn is_reserved_bit_valid(self) -> bool {
		self.0[2] & 0x20 == 0
	}

	/// Whether editors may copy the chunk without understanding it.
	pub fn is_safe_to_copy(self) -> bool {
		self.0[3] & 0x20 != 0
	}

	/// The raw type bytes.
	pub fn bytes(self) -> [u8; 4] {
		self.0
	}
}

impl std::fmt::Display for ChunkType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for &byte in &self.0 {
			let c = if byte.is_ascii_graphic() {
				byte as char
			} else {
				'?'
			};
			write!(f, "{c}")?;
		}
		Ok(())
	}
}

/// A validated chunk borrowed from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'a> {
	chunk_type: ChunkType,
	data: &'a [u8],
}

impl<'a> RawChunk<'a> {
	/// The chunk's type.
	pub fn chunk_type(&self) -> ChunkType {
		self.chunk_type
	}

	/// The chunk payload.
	pub fn data(&self) -> &'a [u8] {
		self.data
	}
}

/// Walks a chunk stream, validating length, type, and CRC of each chunk.
#[derive(Debug)]
pub struct ChunkReader<'a> {
	data: &'a [u8],
	offset: usize,
}

impl<'a> ChunkReader<'a> {
	/// Creates a reader over `data`, which must start at the first chunk
	/// (the 8-byte signature already stripped).
	pub fn new(data: &'a [u8]) -> Self {
		Self {
			data,
			offset: 0,
		}
	}

	/// Returns the next valid chunk, or `None` at end of buffer.
	///
	/// Ancillary chunks with a bad CRC are skipped without being returned.
	pub fn next_chunk(&mut self) -> Result<Option<RawChunk<'a>>, PngError> {
		loop {
			if self.offset == self.data.len() {
				return Ok(None);
			}
			let remaining = &self.data[self.offset..];
			if remaining.len() < 12 {
				return Err(PngError::PrematureEnd);
			}

			let length = u32::from_be_bytes([remaining[0], remaining[1], remaining[2], remaining[3]]);
			if length > MAX_CHUNK_DATA {
				return Err(PngError::ChunkTooLarge(length));
			}
			let type_bytes = [remaining[4], remaining[5], remaining[6], remaining[7]];
			let chunk_type = ChunkType(type_bytes);
			if !chunk_type.is_valid() {
				return Err(PngError::InvalidChunkType(type_bytes));
			}

			let data_len = length as usize;
			if remaining.len() < 12 + data_len {
				return Err(PngError::PrematureEnd);
			}
			let payload = &remaining[8..8 + data_len];
			let stored_crc = u32::from_be_bytes([
				remaining[8 + data_len],
				remaining[9 + data_len],
				remaining[10 + data_len],
				remaining[11 + data_len],
			]);

			let mut crc = Crc32::new();
			crc.update(&type_bytes);
			crc.update(payload);
			let actual_crc = crc.finalize();

			self.offset += 12 + data_len;

			if stored_crc != actual_crc {
				if chunk_type.is_critical() {
					return Err(PngError::InvalidChunkCrc {
						chunk_type: chunk_type.to_string(),
						expected: stored_crc,
						actual: actual_crc,
					});
				}
				// Damaged ancillary chunk: drop it and keep walking
				continue;
			}

			return Ok(Some(RawChunk {
				chunk_type,
				data: payload,
			}));
		}
	}

	/// Byte offset of the next unread chunk.
	pub fn offset(&self) -> usize {
		self.offset
	}
}

/// Appends one chunk (length, type, data, CRC) to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) {
	debug_assert!(data.len() as u64 <= u64::from(MAX_CHUNK_DATA));
	out.extend_from_slice(&(data.len() as u32).to_be_bytes());
	out.extend_from_slice(&chunk_type.bytes());
	out.extend_from_slice(data);

	let mut crc = Crc32::new();
	crc.update(&chunk_type.bytes());
	crc.update(data);
	out.extend_from_slice(&crc.finalize().to_be_bytes());
}
