//! PNG image model and codec.
//!
//! ## File layout
//!
//! | Section | Size | Description |
//! |---------|------|-------------|
//! | signature | 8 | `89 50 4E 47 0D 0A 1A 0A` |
//! | IHDR chunk | 25 | dimensions and pixel format |
//! | PLTE chunk | 12 + 3n | palette, required for indexed color |
//! | IDAT chunks | varies | zlib-wrapped filtered scanlines |
//! | IEND chunk | 12 | zero-length terminator |
//!
//! Every chunk is `length (BE u32) | type (4 ASCII letters) | data | CRC-32`.
//! The submodules cover the pipeline stages: [`chunk`] walks and emits the
//! chunk stream, [`filter`] applies the five scanline predictors,
//! [`interlace`] handles the Adam7 pass permutation, [`decode`]/[`encode`]
//! are the whole-buffer drivers, and [`stream`] holds the incremental
//! decoder and encoder.

pub mod chunk;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod interlace;
pub mod stream;


use std::fmt::Display;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::PngError;

/// The 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Upper bound on `width * height`, rejecting images whose byte sizes could
/// overflow downstream arithmetic.
pub const MAX_PIXELS: u64 = 1 << 30;

/// Pixel color interpretation, serialized as the IHDR color type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ColorType {
	/// Single luminance sample.
	Grayscale = 0,
	/// Red, green, blue.
	Rgb = 2,
	/// Single palette index.
	Indexed = 3,
	/// Luminance plus alpha.
	GrayscaleAlpha = 4,
	/// Red, green, blue, alpha.
	Rgba = 6,
}

impl ColorType {
	/// Parses the IHDR color type byte.
	pub fn from_u8(value: u8) -> Result<Self, PngError> {
		match value {
			0 => Ok(ColorType::Grayscale),
			2 => Ok(ColorType::Rgb),
			3 => Ok(ColorType::Indexed),
			4 => Ok(ColorType::GrayscaleAlpha),
			6 => Ok(ColorType::Rgba),
			other => Err(PngError::InvalidColorType(other)),
		}
	}

	/// Number of samples per pixel.
	pub fn samples(self) -> usize {
		match self {
			ColorType::Grayscale | ColorType::Indexed => 1,
			ColorType::GrayscaleAlpha => 2,
			ColorType::Rgb => 3,
			ColorType::Rgba => 4,
		}
	}

	/// Whether the standard allows this color type at the given bit depth.
	pub fn supports_bit_depth(self, bit_depth: BitDepth) -> bool {
		match self {
			ColorType::Grayscale => true,
			ColorType::Indexed => bit_depth != BitDepth::Sixteen,
			ColorType::Rgb | ColorType::GrayscaleAlpha | ColorType::Rgba => {
				matches!(bit_depth, BitDepth::Eight | BitDepth::Sixteen)
			}
		}
	}
}

impl Display for ColorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ColorType::Grayscale => write!(f, "Grayscale"),
			ColorType::Rgb => write!(f, "RGB"),
			ColorType::Indexed => write!(f, "Indexed"),
			ColorType::GrayscaleAlpha => write!(f, "Grayscale+Alpha"),
			ColorType::Rgba => write!(f, "RGBA"),
		}
	}
}

/// Bits per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BitDepth {
	/// 1 bit per sample.
	One = 1,
	/// 2 bits per sample.
	Two = 2,
	/// 4 bits per sample.
	Four = 4,
	/// 8 bits per sample.
	Eight = 8,
	/// 16 bits per sample, big-endian.
	Sixteen = 16,
}

impl BitDepth {
	/// Parses the IHDR bit depth byte.
	pub fn from_u8(value: u8) -> Result<Self, PngError> {
		match value {
			1 => Ok(BitDepth::One),
			2 => Ok(BitDepth::Two),
			4 => Ok(BitDepth::Four),
			8 => Ok(BitDepth::Eight),
			16 => Ok(BitDepth::Sixteen),
			other => Err(PngError::InvalidBitDepth(other)),
		}
	}

	/// Bits per sample as a number.
	pub fn bits(self) -> usize {
		self as usize
	}
}

impl Display for BitDepth {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", *self as u8)
	}
}

/// Interlace method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Interlace {
	/// Scanlines in order, top to bottom.
	#[default]
	None = 0,
	/// The seven-pass Adam7 scheme.
	Adam7 = 1,
}

impl Interlace {
	/// Parses the IHDR interlace method byte.
	pub fn from_u8(value: u8) -> Result<Self, PngError> {
		match value {
			0 => Ok(Interlace::None),
			1 => Ok(Interlace::Adam7),
			other => Err(PngError::InvalidInterlaceMethod(other)),
		}
	}
}

impl Display for Interlace {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Interlace::None => write!(f, "None"),
			Interlace::Adam7 => write!(f, "Adam7"),
		}
	}
}

/// Parsed IHDR data.
///
/// The compression and filter method bytes are validated to zero on parse
/// and emitted as zero; only the five meaningful fields are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Header {
	width: u32,
	height: u32,
	bit_depth: BitDepth,
	color_type: ColorType,
	interlace: Interlace,
}

impl Header {
	/// Size of the IHDR payload in bytes.
	pub const SIZE: usize = 13;

	/// Creates a validated header.
	pub fn new(
		width: u32,
		height: u32,
		bit_depth: BitDepth,
		color_type: ColorType,
		interlace: Interlace,
	) -> Result<Self, PngError> {
		if width == 0 || width > i32::MAX as u32 {
			return Err(PngError::InvalidWidth(width));
		}
		if height == 0 || height > i32::MAX as u32 {
			return Err(PngError::InvalidHeight(height));
		}
		if !color_type.supports_bit_depth(bit_depth) {
			return Err(PngError::InvalidColorBitDepthCombo {
				color_type: color_type as u8,
				bit_depth: bit_depth as u8,
			});
		}
		if u64::from(width) * u64::from(height) > MAX_PIXELS {
			return Err(PngError::DimensionsOverflow {
				width,
				height,
			});
		}

		Ok(Self {
			width,
			height,
			bit_depth,
			color_type,
			interlace,
		})
	}

	/// Image width in pixels.
	pub fn width(&self) -> u32 {
		self.width
	}

	/// Image height in pixels.
	pub fn height(&self) -> u32 {
		self.height
	}

	/// Bits per sample.
	pub fn bit_depth(&self) -> BitDepth {
		self.bit_depth
	}

	/// Color interpretation.
	pub fn color_type(&self) -> ColorType {
		self.color_type
	}

	/// Interlace method.
	pub fn interlace(&self) -> Interlace {
		self.interlace
	}

	/// Bits per pixel (samples times bit depth).
	pub fn bits_per_pixel(&self) -> usize {
		self.color_type.samples() * self.bit_depth.bits()
	}

	/// Whole bytes per pixel; 0 for sub-byte packed formats.
	pub fn bytes_per_pixel(&self) -> usize {
		self.bits_per_pixel() / 8
	}

	/// The byte offset between corresponding filter bytes: bytes per pixel,
	/// but never less than 1.
	pub fn filter_unit(&self) -> usize {
		self.bytes_per_pixel().max(1)
	}

	/// Packed bytes in one full-width row.
	pub fn row_bytes(&self) -> usize {
		self.row_bytes_for_width(self.width)
	}

	/// Packed bytes in one row of `width` pixels, sub-byte rows rounded up
	/// to a whole byte with zero padding.
	pub fn row_bytes_for_width(&self, width: u32) -> usize {
		(width as usize * self.bits_per_pixel()).div_ceil(8)
	}

	/// Size of the tightly packed pixel buffer for the whole image.
	pub fn pixel_buffer_len(&self) -> usize {
		self.height as usize * self.row_bytes()
	}

	/// Parses the 13-byte IHDR payload.
	pub fn from_bytes(data: &[u8]) -> Result<Self, PngError> {
		if data.len() != Self::SIZE {
			return Err(PngError::BufferSizeMismatch {
				expected: Self::SIZE,
				actual: data.len(),
			});
		}

		let width = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
		let height = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
		let bit_depth = BitDepth::from_u8(data[8])?;
		let color_type = ColorType::from_u8(data[9])?;
		if data[10] != 0 {
			return Err(PngError::InvalidCompressionMethod(data[10]));
		}
		if data[11] != 0 {
			return Err(PngError::InvalidFilterMethod(data[11]));
		}
		let interlace = Interlace::from_u8(data[12])?;

		Self::new(width, height, bit_depth, color_type, interlace)
	}

	/// Reads and parses an IHDR payload from a reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, PngError> {
		let mut buffer = [0u8; Self::SIZE];
		reader.read_exact(&mut buffer)?;
		Self::from_bytes(&buffer)
	}

	/// Serializes the 13-byte IHDR payload.
	pub fn to_bytes(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.width.to_be_bytes());
		bytes[4..8].copy_from_slice(&self.height.to_be_bytes());
		bytes[8] = self.bit_depth as u8;
		bytes[9] = self.color_type as u8;
		// bytes 10..12 stay 0: deflate compression, adaptive filtering
		bytes[12] = self.interlace as u8;
		bytes
	}
}

impl Display for Header {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"PNG Header:\n\
			- Dimensions: {}x{} pixels\n\
			- Color Type: {}\n\
			- Bit Depth: {}\n\
			- Interlace: {}",
			self.width, self.height, self.color_type, self.bit_depth, self.interlace,
		)
	}
}

/// One RGB palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteEntry {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
}

impl PaletteEntry {
	/// Creates an entry from its components.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r,
			g,
			b,
		}
	}
}

impl Display for PaletteEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "RGB({}, {}, {})", self.r, self.g, self.b)
	}
}

/// An ordered palette of 1 to 256 RGB entries (the PLTE payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
	entries: Vec<PaletteEntry>,
}

impl Palette {
	/// Largest number of entries a palette can hold.
	pub const MAX_ENTRIES: usize = 256;

	/// Creates a palette from entries, enforcing the 1..=256 count.
	pub fn from_entries(entries: Vec<PaletteEntry>) -> Result<Self, PngError> {
		if entries.is_empty() || entries.len() > Self::MAX_ENTRIES {
			return Err(PngError::InvalidPaletteSize(entries.len() * 3));
		}
		Ok(Self {
			entries,
		})
	}

	/// Parses a PLTE payload: a multiple of 3 bytes, 1..=256 triples.
	pub fn from_bytes(data: &[u8]) -> Result<Self, PngError> {
		if data.is_empty() || data.len() % 3 != 0 || data.len() / 3 > Self::MAX_ENTRIES {
			return Err(PngError::InvalidPaletteSize(data.len()));
		}
		let entries = data.chunks_exact(3).map(|rgb| PaletteEntry::new(rgb[0], rgb[1], rgb[2])).collect();
		Ok(Self {
			entries,
		})
	}

	/// Serializes the PLTE payload.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(self.entries.len() * 3);
		for entry in &self.entries {
			data.push(entry.r);
			data.push(entry.g);
			data.push(entry.b);
		}
		data
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// A palette is never empty; this exists for the `len`/`is_empty` pair.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entry at `index`, or `None` past the end of the palette.
	pub fn get(&self, index: u8) -> Option<PaletteEntry> {
		self.entries.get(usize::from(index)).copied()
	}

	/// All entries in order.
	pub fn entries(&self) -> &[PaletteEntry] {
		&self.entries
	}
}

impl Display for Palette {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Palette: {} colors", self.entries.len())
	}
}

/// A decoded image: header, tightly packed pixels, optional palette.
///
/// Indexed images keep their palette indices in the pixel buffer; the
/// palette is carried alongside, never expanded.
#[derive(Debug, Clone)]
pub struct Image {
	header: Header,
	pixels: Vec<u8>,
	palette: Option<Palette>,
}

impl Image {
	/// Creates an image, validating buffer size and palette rules.
	pub fn new(
		header: Header,
		pixels: Vec<u8>,
		palette: Option<Palette>,
	) -> Result<Self, PngError> {
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
		Ok(Self {
			header,
			pixels,
			palette,
		})
	}

	/// The image header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// The packed pixel buffer.
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// The palette, present for indexed images.
	pub fn palette(&self) -> Option<&Palette> {
		self.palette.as_ref()
	}

	/// Consumes the image, returning its parts.
	pub fn into_parts(self) -> (Header, Vec<u8>, Option<Palette>) {
		(self.header, self.pixels, self.palette)
	}

	/// Decodes a PNG file from a path.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, PngError> {
		let data = std::fs::read(path)?;
		decode::decode(&data)
	}

	/// Encodes the image to a path with default options.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PngError> {
		self.save_with_options(path, &encode::EncodeOptions::default())
	}

	/// Encodes the image to a path.
	pub fn save_with_options(
		&self,
		path: impl AsRef<Path>,
		options: &encode::EncodeOptions,
	) -> Result<(), PngError> {
		let bytes = encode::encode(self, options)?;
		std::fs::write(path, bytes)?;
		Ok(())
	}
}
