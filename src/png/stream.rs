//! Streaming PNG decode and encode.
//!
//! [`StreamDecoder`] is byte-fed: the caller hands it arbitrary slices and
//! drains completed scanlines with [`StreamDecoder::next_row`]. Internally
//! it is an explicit state machine (signature, IHDR, chunk stream,
//! finished); IDAT payload accumulates and is decompressed in one pass when
//! IEND arrives, after which rows drain lazily. Interlaced input is
//! rejected with [`PngError::InterlacedNotSupported`]; such files take the
//! whole-buffer [`crate::png::decode::decode`] path instead.
//!
//! [`StreamEncoder`] is row-fed and generic over a [`Write`] sink. The
//! signature, IHDR, and any PLTE are written on construction; each
//! [`StreamEncoder::write_row`] filters and buffers one row, and
//! [`StreamEncoder::finish`] compresses the accumulated scanlines and
//! emits the IDAT segments and IEND.

use std::io::Write;

use crate::checksum::Crc32;
use crate::error::PngError;
use crate::flate::zlib;
use crate::png::chunk::{ChunkType, MAX_CHUNK_DATA, write_chunk};
use crate::png::decode::{alloc_pixel_buffer, unfilter_rows};
use crate::png::encode::{EncodeOptions, IDAT_SEGMENT_SIZE};
use crate::png::filter::apply_filter;
use crate::png::interlace;
use crate::png::{ColorType, Header, Image, Interlace, Palette, SIGNATURE};

/// What a call to [`StreamDecoder::feed`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
	/// Nothing new is available; feed more bytes.
	NeedMoreData,
	/// Scanlines are ready to drain with [`StreamDecoder::next_row`].
	RowsReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
	AwaitingSignature,
	AwaitingIhdr,
	InChunks,
	Finished,
}

/// Incremental PNG decoder.
#[derive(Debug)]
pub struct StreamDecoder {
	state: DecoderState,
	buffer: Vec<u8>,
	header: Option<Header>,
	palette: Option<Palette>,
	idat: Vec<u8>,
	seen_idat: bool,
	idat_closed: bool,
	rows: Vec<u8>,
	rows_drained: usize,
}

impl StreamDecoder {
	/// Creates a decoder awaiting the PNG signature.
	pub fn new() -> Self {
		Self {
			state: DecoderState::AwaitingSignature,
			buffer: Vec::new(),
			header: None,
			palette: None,
			idat: Vec::new(),
			seen_idat: false,
			idat_closed: false,
			rows: Vec::new(),
			rows_drained: 0,
		}
	}

	/// The header, available once IHDR has been fed.
	pub fn header(&self) -> Option<&Header> {
		self.header.as_ref()
	}

	/// Feeds more input and drives the state machine as far as it can go.
	///
	/// Bytes arriving after IEND are ignored.
	pub fn feed(&mut self, bytes: &[u8]) -> Result<FeedStatus, PngError> {
		if self.state == DecoderState::Finished {
			return Ok(FeedStatus::RowsReady);
		}
		self.buffer.extend_from_slice(bytes);
		self.process()?;
		if self.state == DecoderState::Finished {
			Ok(FeedStatus::RowsReady)
		} else {
			Ok(FeedStatus::NeedMoreData)
		}
	}

	/// Returns the next undrained scanline, without its filter byte.
	pub fn next_row(&mut self) -> Option<&[u8]> {
		let header = self.header.as_ref()?;
		if self.state != DecoderState::Finished {
			return None;
		}
		if self.rows_drained >= header.height() as usize {
			return None;
		}
		let row_bytes = header.row_bytes();
		let row = &self.rows[self.rows_drained * row_bytes..][..row_bytes];
		self.rows_drained += 1;
		Some(row)
	}

	/// Consumes the decoder and assembles the image. IEND must have been
	/// reached.
	pub fn finish(self) -> Result<Image, PngError> {
		if self.state != DecoderState::Finished {
			return Err(PngError::PrematureEnd);
		}
		let Some(header) = self.header else {
			return Err(PngError::MissingIhdr);
		};
		Image::new(header, self.rows, self.palette)
	}

	fn process(&mut self) -> Result<(), PngError> {
		loop {
			match self.state {
				DecoderState::AwaitingSignature => {
					if self.buffer.len() < SIGNATURE.len() {
						return Ok(());
					}
					if self.buffer[..SIGNATURE.len()] != SIGNATURE {
						return Err(PngError::InvalidSignature);
					}
					self.buffer.drain(..SIGNATURE.len());
					self.state = DecoderState::AwaitingIhdr;
				}
				DecoderState::AwaitingIhdr | DecoderState::InChunks => {
					if !self.step_chunk()? {
						return Ok(());
					}
				}
				DecoderState::Finished => return Ok(()),
			}
		}
	}

	/// Parses one complete chunk from the buffer. Returns `false` when the
	/// buffer does not hold a full chunk yet.
	fn step_chunk(&mut self) -> Result<bool, PngError> {
		if self.buffer.len() < 8 {
			return Ok(false);
		}
		let length =
			u32::from_be_bytes([self.buffer[0], self.buffer[1], self.buffer[2], self.buffer[3]]);
		if length > MAX_CHUNK_DATA {
			return Err(PngError::ChunkTooLarge(length));
		}
		let type_bytes = [self.buffer[4], self.buffer[5], self.buffer[6], self.buffer[7]];
		let chunk_type = ChunkType(type_bytes);
		if !chunk_type.is_valid() {
			return Err(PngError::InvalidChunkType(type_bytes));
		}

		let data_len = length as usize;
		let total = 12 + data_len;
		if self.buffer.len() < total {
			return Ok(false);
		}

		let payload = &self.buffer[8..8 + data_len];
		let stored_crc = u32::from_be_bytes([
			self.buffer[8 + data_len],
			self.buffer[9 + data_len],
			self.buffer[10 + data_len],
			self.buffer[11 + data_len],
		]);
		let mut crc = Crc32::new();
		crc.update(&type_bytes);
		crc.update(payload);
		let crc_ok = crc.finalize() == stored_crc;

		if !crc_ok {
			if chunk_type.is_critical() {
				return Err(PngError::InvalidChunkCrc {
					chunk_type: chunk_type.to_string(),
					expected: stored_crc,
					actual: crc.finalize(),
				});
			}
			// Damaged ancillary chunk: drop it
			self.buffer.drain(..total);
			return Ok(true);
		}

		self.handle_chunk(chunk_type, 8, data_len)?;
		self.buffer.drain(..total);
		Ok(true)
	}

	/// Applies one validated chunk. The payload lives at
	/// `buffer[payload_start..payload_start + data_len]`.
	fn handle_chunk(
		&mut self,
		chunk_type: ChunkType,
		payload_start: usize,
		data_len: usize,
	) -> Result<(), PngError> {
		let payload = &self.buffer[payload_start..payload_start + data_len];

		if self.state == DecoderState::AwaitingIhdr {
			if chunk_type != ChunkType::IHDR {
				return Err(PngError::MissingIhdr);
			}
			let header = Header::from_bytes(payload)?;
			if header.interlace() == Interlace::Adam7 {
				return Err(PngError::InterlacedNotSupported);
			}
			self.header = Some(header);
			self.state = DecoderState::InChunks;
			return Ok(());
		}

		match chunk_type {
			ChunkType::IHDR => Err(PngError::DuplicateIhdr),
			ChunkType::PLTE => {
				let Some(header) = self.header.as_ref() else {
					return Err(PngError::MissingIhdr);
				};
				if self.seen_idat {
					return Err(PngError::PlteAfterIdat);
				}
				if self.palette.is_some() {
					return Err(PngError::ChunkOrderViolation("duplicate PLTE chunk"));
				}
				if matches!(
					header.color_type(),
					ColorType::Grayscale | ColorType::GrayscaleAlpha
				) {
					return Err(PngError::PlteForNonIndexed);
				}
				self.palette = Some(Palette::from_bytes(payload)?);
				Ok(())
			}
			ChunkType::IDAT => {
				if self.idat_closed {
					return Err(PngError::ChunkOrderViolation("IDAT chunks must be contiguous"));
				}
				self.seen_idat = true;
				self.idat.extend_from_slice(payload);
				Ok(())
			}
			ChunkType::IEND => {
				self.finish_idat()?;
				self.state = DecoderState::Finished;
				Ok(())
			}
			_ => {
				if self.seen_idat {
					self.idat_closed = true;
				}
				Ok(())
			}
		}
	}

	/// Decompresses and unfilters the accumulated IDAT payload.
	fn finish_idat(&mut self) -> Result<(), PngError> {
		let Some(header) = self.header.as_ref() else {
			return Err(PngError::MissingIhdr);
		};
		if !self.seen_idat {
			return Err(PngError::MissingIdat);
		}
		if header.color_type() == ColorType::Indexed && self.palette.is_none() {
			return Err(PngError::MissingPlteForIndexed);
		}

		let raw_len = interlace::raw_stream_len(header);
		let raw = zlib::decompress(&self.idat, raw_len)?;
		if raw.len() != raw_len {
			return Err(crate::error::FlateError::UnexpectedEndOfStream.into());
		}
		self.idat = Vec::new();

		let mut rows = alloc_pixel_buffer(header.pixel_buffer_len())?;
		unfilter_rows(header, &raw, header.row_bytes(), header.height(), &mut rows)?;
		self.rows = rows;
		Ok(())
	}
}

impl Default for StreamDecoder {
	fn default() -> Self {
		Self::new()
	}
}

/// Incremental PNG encoder over a byte sink.
#[derive(Debug)]
pub struct StreamEncoder<W: Write> {
	sink: W,
	header: Header,
	options: EncodeOptions,
	filtered: Vec<u8>,
	prev_row: Vec<u8>,
	scratch: Vec<u8>,
	row_buf: Vec<u8>,
	rows_written: u32,
	finished: bool,
}

impl<W: Write> StreamEncoder<W> {
	/// Creates an encoder and immediately writes the signature, IHDR, and -
	/// for indexed images - the PLTE chunk to the sink.
	pub fn new(
		sink: W,
		header: Header,
		palette: Option<&Palette>,
		options: EncodeOptions,
	) -> Result<Self, PngError> {
		if header.interlace() == Interlace::Adam7 {
			return Err(PngError::InterlacedNotSupported);
		}
		match header.color_type() {
			ColorType::Indexed if palette.is_none() => {
				return Err(PngError::MissingPlteForIndexed);
			}
			ColorType::Grayscale | ColorType::GrayscaleAlpha if palette.is_some() => {
				return Err(PngError::PlteForNonIndexed);
			}
			_ => {}
		}

		let mut encoder = Self {
			sink,
			header,
			options,
			filtered: Vec::with_capacity(interlace::raw_stream_len(&header)),
			prev_row: Vec::new(),
			scratch: vec![0u8; header.row_bytes()],
			row_buf: vec![0u8; header.row_bytes()],
			rows_written: 0,
			finished: false,
		};

		let mut head = Vec::with_capacity(64 + palette.map_or(0, |p| p.len() * 3));
		head.extend_from_slice(&SIGNATURE);
		write_chunk(&mut head, ChunkType::IHDR, &header.to_bytes());
		if let Some(palette) = palette {
			write_chunk(&mut head, ChunkType::PLTE, &palette.to_bytes());
		}
		encoder.sink.write_all(&head)?;
		Ok(encoder)
	}

	/// The header this encoder was configured with.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Filters and buffers one packed scanline.
	pub fn write_row(&mut self, row: &[u8]) -> Result<(), PngError> {
		if self.finished {
			return Err(PngError::AlreadyFinished);
		}
		if self.rows_written >= self.header.height() {
			return Err(PngError::RowCountMismatch {
				expected: self.header.height(),
				actual: self.rows_written + 1,
			});
		}
		let row_bytes = self.header.row_bytes();
		if row.len() != row_bytes {
			return Err(PngError::BufferSizeMismatch {
				expected: row_bytes,
				actual: row.len(),
			});
		}

		let prev = if self.rows_written > 0 {
			Some(self.prev_row.as_slice())
		} else {
			None
		};
		let chosen = apply_filter(
			self.options.filter_strategy,
			row,
			prev,
			self.header.filter_unit(),
			&mut self.scratch,
			&mut self.row_buf,
		);
		self.filtered.push(chosen as u8);
		self.filtered.extend_from_slice(&self.row_buf);

		// The raw row becomes the predecessor for the next row's filters
		self.prev_row.clear();
		self.prev_row.extend_from_slice(row);
		self.rows_written += 1;
		Ok(())
	}

	/// Compresses the buffered scanlines and writes IDAT and IEND.
	pub fn finish(&mut self) -> Result<(), PngError> {
		if self.finished {
			return Err(PngError::AlreadyFinished);
		}
		if self.rows_written != self.header.height() {
			return Err(PngError::RowCountMismatch {
				expected: self.header.height(),
				actual: self.rows_written,
			});
		}
		self.finished = true;

		let compressed = zlib::compress(&self.filtered, self.options.compression_level);
		let mut tail = Vec::with_capacity(compressed.len() + 64);
		for segment in compressed.chunks(IDAT_SEGMENT_SIZE) {
			write_chunk(&mut tail, ChunkType::IDAT, segment);
		}
		write_chunk(&mut tail, ChunkType::IEND, &[]);
		self.sink.write_all(&tail)?;
		self.sink.flush()?;
		Ok(())
	}

	/// Consumes the encoder, returning the sink.
	pub fn into_inner(self) -> W {
		self.sink
	}
}
