//! RFC 1951 deflate decompression.
//!
//! A block-driven state machine: every block starts with a BFINAL bit and a
//! 2-bit BTYPE selecting stored, fixed-Huffman, or dynamic-Huffman content.
//! Dynamic blocks carry their own code lengths, themselves compressed with
//! the code-length alphabet and its run-length opcodes 16/17/18.
//!
//! The caller pre-sizes the output: `size_limit` is both the allocation hint
//! and a hard cap. Exceeding it reports
//! [`FlateError::OutputBufferFull`] without corrupting the decoder's state
//! invariants; failing to allocate it reports [`FlateError::OutOfMemory`].

use crate::bitstream::BitReader;
use crate::error::FlateError;
use crate::flate::huffman::{self, DecodeTable};
use crate::flate::lz77::{DIST_BASE, DIST_EXTRA, LENGTH_BASE, LENGTH_EXTRA};

/// Order in which code lengths of the code-length alphabet are transmitted.
pub(crate) const CODE_LENGTH_ORDER: [usize; 19] =
	[16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

/// Decompresses a complete deflate stream.
///
/// `size_limit` is the expected output size: it is reserved up front and
/// enforced as a hard cap.
pub fn inflate(data: &[u8], size_limit: usize) -> Result<Vec<u8>, FlateError> {
	let (out, _) = inflate_partial(data, size_limit)?;
	Ok(out)
}

/// Decompresses a deflate stream that may be followed by trailing bytes.
///
/// Returns the output together with the number of input bytes the deflate
/// stream occupied (rounded up to a whole byte), which is where a zlib
/// trailer begins.
pub fn inflate_partial(data: &[u8], size_limit: usize) -> Result<(Vec<u8>, usize), FlateError> {
	let mut decoder = Inflater::new(data, size_limit)?;
	decoder.run()?;
	decoder.reader.align_to_byte();
	let consumed = decoder.reader.bytes_consumed();
	Ok((decoder.out, consumed))
}

struct Inflater<'a> {
	reader: BitReader<'a>,
	out: Vec<u8>,
	limit: usize,
}

impl<'a> Inflater<'a> {
	fn new(data: &'a [u8], limit: usize) -> Result<Self, FlateError> {
		let mut out = Vec::new();
		out.try_reserve_exact(limit).map_err(|_| FlateError::OutOfMemory {
			requested: limit,
		})?;
		Ok(Self {
			reader: BitReader::new(data),
			out,
			limit,
		})
	}

	fn run(&mut self) -> Result<(), FlateError> {
		loop {
			let bfinal = self.reader.read_bits(1)?;
			let btype = self.reader.read_bits(2)?;
			match btype {
				0 => self.stored_block()?,
				1 => self.huffman_block(
					huffman::fixed_litlen_decoder(),
					huffman::fixed_dist_decoder(),
				)?,
				2 => {
					let (litlen, dist) = self.dynamic_tables()?;
					self.huffman_block(&litlen, &dist)?;
				}
				_ => return Err(FlateError::InvalidBlockType(btype as u8)),
			}
			if bfinal == 1 {
				return Ok(());
			}
		}
	}

	fn ensure_room(&self, additional: usize) -> Result<(), FlateError> {
		if self.out.len() + additional > self.limit {
			return Err(FlateError::OutputBufferFull {
				limit: self.limit,
			});
		}
		Ok(())
	}

	fn stored_block(&mut self) -> Result<(), FlateError> {
		self.reader.align_to_byte();
		let len = u16::from(self.reader.read_aligned_byte()?)
			| (u16::from(self.reader.read_aligned_byte()?) << 8);
		let nlen = u16::from(self.reader.read_aligned_byte()?)
			| (u16::from(self.reader.read_aligned_byte()?) << 8);
		if nlen != !len {
			return Err(FlateError::InvalidStoredLength {
				len,
				nlen,
			});
		}
		self.ensure_room(usize::from(len))?;
		for _ in 0..len {
			let byte = self.reader.read_aligned_byte()?;
			self.out.push(byte);
		}
		Ok(())
	}

	fn huffman_block(
		&mut self,
		litlen: &DecodeTable,
		dist: &DecodeTable,
	) -> Result<(), FlateError> {
		loop {
			let symbol = litlen.decode(&mut self.reader)?;
			if symbol < 256 {
				self.ensure_room(1)?;
				self.out.push(symbol as u8);
				continue;
			}
			if symbol == 256 {
				return Ok(());
			}
			if symbol > 285 {
				return Err(FlateError::InvalidLengthCode(symbol));
			}

			let len_index = usize::from(symbol) - 257;
			let length = usize::from(LENGTH_BASE[len_index])
				+ self.reader.read_bits(u32::from(LENGTH_EXTRA[len_index]))? as usize;

			let dist_symbol = dist.decode(&mut self.reader)?;
			if dist_symbol > 29 {
				return Err(FlateError::InvalidDistance {
					distance: usize::from(dist_symbol),
					available: self.out.len(),
				});
			}
			let dist_index = usize::from(dist_symbol);
			let distance = usize::from(DIST_BASE[dist_index])
				+ self.reader.read_bits(u32::from(DIST_EXTRA[dist_index]))? as usize;

			if distance > self.out.len() {
				return Err(FlateError::InvalidDistance {
					distance,
					available: self.out.len(),
				});
			}

			self.ensure_room(length)?;
			// Byte-by-byte forward copy so overlapping references replicate
			// the run they are still producing
			for _ in 0..length {
				let byte = self.out[self.out.len() - distance];
				self.out.push(byte);
			}
		}
	}

	fn dynamic_tables(&mut self) -> Result<(DecodeTable, DecodeTable), FlateError> {
		let hlit = self.reader.read_bits(5)? as usize + 257;
		let hdist = self.reader.read_bits(5)? as usize + 1;
		let hclen = self.reader.read_bits(4)? as usize + 4;
		if hlit > 286 || hdist > 30 {
			return Err(FlateError::InvalidHuffmanCode);
		}

		let mut cl_lengths = [0u8; 19];
		for &slot in CODE_LENGTH_ORDER.iter().take(hclen) {
			cl_lengths[slot] = self.reader.read_bits(3)? as u8;
		}
		let cl_table = DecodeTable::build(&cl_lengths)?;

		let total = hlit + hdist;
		let mut lengths = Vec::with_capacity(total);
		while lengths.len() < total {
			let symbol = cl_table.decode(&mut self.reader)?;
			match symbol {
				0..=15 => lengths.push(symbol as u8),
				16 => {
					let Some(&previous) = lengths.last() else {
						return Err(FlateError::InvalidHuffmanCode);
					};
					let repeat = 3 + self.reader.read_bits(2)? as usize;
					for _ in 0..repeat {
						lengths.push(previous);
					}
				}
				17 => {
					let repeat = 3 + self.reader.read_bits(3)? as usize;
					lengths.resize(lengths.len() + repeat, 0);
				}
				18 => {
					let repeat = 11 + self.reader.read_bits(7)? as usize;
					lengths.resize(lengths.len() + repeat, 0);
				}
				_ => return Err(FlateError::InvalidHuffmanCode),
			}
		}
		if lengths.len() != total {
			// A repeat opcode ran past the declared length count
			return Err(FlateError::InvalidHuffmanCode);
		}

		let litlen = DecodeTable::build(&lengths[..hlit])?;
		let dist = DecodeTable::build(&lengths[hlit..])?;
		Ok((litlen, dist))
	}
}
