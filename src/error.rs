//! Error types for PNG and deflate stream processing.

use thiserror::Error;

/// Errors produced by the RFC 1950/1951 compression engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlateError {
	/// The 2-byte zlib header is structurally invalid (bad method or window size)
	#[error("Invalid zlib header: CMF={cmf:#04X} FLG={flg:#04X}")]
	InvalidZlibHeader {
		/// Compression method and flags byte
		cmf: u8,
		/// Flags byte
		flg: u8,
	},

	/// The zlib header FCHECK value does not make CMF*256+FLG a multiple of 31
	#[error("Invalid zlib header check: CMF*256+FLG = {0} is not a multiple of 31")]
	InvalidZlibChecksum(u16),

	/// The Adler-32 trailer does not match the decompressed data
	#[error("Adler-32 mismatch: stream trailer {expected:#010X}, computed {actual:#010X}")]
	AdlerMismatch {
		/// Checksum stored in the stream trailer
		expected: u32,
		/// Checksum computed over the decompressed bytes
		actual: u32,
	},

	/// The zlib header requests a preset dictionary (FDICT = 1)
	#[error("Preset dictionaries are not supported (FDICT = 1)")]
	DictNotSupported,

	/// A deflate block carries the reserved block type 3
	#[error("Invalid deflate block type: {0}")]
	InvalidBlockType(u8),

	/// A stored block's NLEN field is not the complement of LEN
	#[error("Invalid stored block length: LEN={len:#06X} NLEN={nlen:#06X}")]
	InvalidStoredLength {
		/// LEN field of the stored block
		len: u16,
		/// NLEN field of the stored block
		nlen: u16,
	},

	/// The bit stream does not match any code in the active Huffman tree
	#[error("Invalid Huffman code in deflate stream")]
	InvalidHuffmanCode,

	/// A set of code lengths over-subscribes the code space (Kraft sum > 1)
	#[error("Over-subscribed Huffman code lengths")]
	IncompleteTree,

	/// A back-reference distance reaches before the start of the output
	#[error("Invalid match distance {distance} with only {available} bytes produced")]
	InvalidDistance {
		/// Distance decoded from the stream
		distance: usize,
		/// Number of bytes produced so far
		available: usize,
	},

	/// A literal/length symbol outside the valid 0..=285 range
	#[error("Invalid length code {0}")]
	InvalidLengthCode(u16),

	/// The input ended before the stream was structurally complete
	#[error("Unexpected end of deflate stream")]
	UnexpectedEndOfStream,

	/// Decompression would exceed the caller-provided output limit
	#[error("Output buffer full: limit of {limit} bytes exceeded")]
	OutputBufferFull {
		/// Output byte limit supplied by the caller
		limit: usize,
	},

	/// The output buffer could not be allocated
	#[error("Out of memory allocating {requested} bytes of output")]
	OutOfMemory {
		/// Number of bytes that could not be reserved
		requested: usize,
	},
}

/// Errors that can occur when decoding or encoding PNG images.
#[derive(Debug, Error)]
pub enum PngError {
	/// The 8-byte PNG signature is missing or wrong
	#[error("Invalid PNG signature")]
	InvalidSignature,

	/// The first chunk of the stream is not IHDR
	#[error("Missing IHDR chunk: a PNG stream must begin with IHDR")]
	MissingIhdr,

	/// The stream carries no IDAT chunk
	#[error("Missing IDAT chunk")]
	MissingIdat,

	/// The stream ended without an IEND chunk
	#[error("Missing IEND chunk")]
	MissingIend,

	/// The buffer ended in the middle of a chunk
	#[error("Premature end of data inside a chunk")]
	PrematureEnd,

	/// More than one IHDR chunk appeared
	#[error("Duplicate IHDR chunk")]
	DuplicateIhdr,

	/// A chunk appeared in a position the PNG grammar forbids
	#[error("Chunk order violation: {0}")]
	ChunkOrderViolation(&'static str),

	/// A chunk type byte is outside A-Z / a-z
	#[error("Invalid chunk type: {0:02X?}")]
	InvalidChunkType([u8; 4]),

	/// A critical chunk's CRC does not match its contents
	#[error("CRC mismatch in {chunk_type} chunk: stored {expected:#010X}, computed {actual:#010X}")]
	InvalidChunkCrc {
		/// Four-letter chunk type name
		chunk_type: String,
		/// CRC stored in the file
		expected: u32,
		/// CRC computed over type and data
		actual: u32,
	},

	/// A chunk declares a length above 2^31 - 1
	#[error("Chunk too large: declared length {0} bytes")]
	ChunkTooLarge(u32),

	/// Image width of zero or above 2^31 - 1
	#[error("Invalid image width: {0}")]
	InvalidWidth(u32),

	/// Image height of zero or above 2^31 - 1
	#[error("Invalid image height: {0}")]
	InvalidHeight(u32),

	/// Bit depth outside {1, 2, 4, 8, 16}
	#[error("Invalid bit depth: {0}")]
	InvalidBitDepth(u8),

	/// Color type byte outside {0, 2, 3, 4, 6}
	#[error("Invalid color type: {0}")]
	InvalidColorType(u8),

	/// A (color type, bit depth) pairing the PNG standard forbids
	#[error("Invalid combination of color type {color_type} and bit depth {bit_depth}")]
	InvalidColorBitDepthCombo {
		/// Color type byte
		color_type: u8,
		/// Bit depth value
		bit_depth: u8,
	},

	/// IHDR compression method other than 0 (deflate)
	#[error("Invalid compression method: {0} (only 0 = deflate is defined)")]
	InvalidCompressionMethod(u8),

	/// IHDR filter method other than 0 (adaptive)
	#[error("Invalid filter method: {0} (only 0 = adaptive is defined)")]
	InvalidFilterMethod(u8),

	/// IHDR interlace method other than 0 or 1
	#[error("Invalid interlace method: {0}")]
	InvalidInterlaceMethod(u8),

	/// width * height exceeds the 2^30 pixel cap
	#[error("Image dimensions overflow: {width} x {height} exceeds the pixel limit")]
	DimensionsOverflow {
		/// Declared image width
		width: u32,
		/// Declared image height
		height: u32,
	},

	/// Indexed-color image without a PLTE chunk before IDAT
	#[error("Missing PLTE chunk for indexed-color image")]
	MissingPlteForIndexed,

	/// PLTE payload not 3 * n bytes for n in 1..=256
	#[error("Invalid palette size: {0} bytes")]
	InvalidPaletteSize(usize),

	/// PLTE chunk in a grayscale image
	#[error("PLTE chunk is forbidden for grayscale color types")]
	PlteForNonIndexed,

	/// PLTE chunk after the first IDAT
	#[error("PLTE chunk appeared after IDAT")]
	PlteAfterIdat,

	/// Scanline filter selector outside 0..=4
	#[error("Invalid scanline filter type: {0}")]
	InvalidFilterType(u8),

	/// A size computation overflowed the platform word
	#[error("Size computation overflow")]
	SizeOverflow,

	/// A pixel buffer could not be allocated
	#[error("Out of memory allocating {requested} bytes")]
	OutOfMemory {
		/// Number of bytes that could not be reserved
		requested: usize,
	},

	/// A caller-provided buffer does not match the expected length
	#[error("Buffer size mismatch: expected {expected} bytes, got {actual} bytes")]
	BufferSizeMismatch {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Streaming mode does not handle Adam7-interlaced images
	#[error("Interlaced images are not supported in streaming mode")]
	InterlacedNotSupported,

	/// The streaming engine was finished twice
	#[error("Stream already finished")]
	AlreadyFinished,

	/// The streaming encoder was finished with the wrong number of rows
	#[error("Row count mismatch: header declares {expected} rows, received {actual}")]
	RowCountMismatch {
		/// Rows declared by the header
		expected: u32,
		/// Rows actually written
		actual: u32,
	},

	/// Compression layer error
	#[error(transparent)]
	Flate(#[from] FlateError),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
