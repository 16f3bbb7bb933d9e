//! `purepng` is a pure-Rust PNG encoder and decoder.
//!
//! The whole pipeline is implemented in this crate: RFC 1951 deflate with
//! LZ77 matching and canonical Huffman coding, RFC 1950 zlib framing with
//! Adler-32 trailers, the PNG chunk grammar with CRC-32 validation, the five
//! scanline filters, and Adam7 interlacing. No external compression or
//! image library is linked.
//!
//! # Examples
//!
//! ```
//! use purepng::prelude::*;
//!
//! // Encode a 2x2 grayscale image and read it back
//! let header = Header::new(2, 2, BitDepth::Eight, ColorType::Grayscale, Interlace::None)?;
//! let image = Image::new(header, vec![0x00, 0x40, 0x80, 0xFF], None)?;
//!
//! let bytes = purepng::encode(&image, &EncodeOptions::default())?;
//! let decoded = purepng::decode(&bytes)?;
//! assert_eq!(decoded.pixels(), image.pixels());
//! # Ok::<(), purepng::PngError>(())
//! ```

pub mod bitstream;
pub mod checksum;
pub mod flate;
pub mod png;

mod error;

/// `use purepng::prelude::*;` to import commonly used items.
pub mod prelude;

pub use error::{FlateError, PngError};

// Re-export the main entry points and types at the crate root
pub use flate::CompressionLevel;
pub use png::decode::decode;
pub use png::encode::{
	EncodeOptions, encode, encode_into, encode_raw, encode_raw_into, max_encoded_size,
};
pub use png::filter::{FilterStrategy, FilterType};
pub use png::stream::{FeedStatus, StreamDecoder, StreamEncoder};
pub use png::{
	BitDepth, ColorType, Header, Image, Interlace, Palette, PaletteEntry, SIGNATURE,
};
