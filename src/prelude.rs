//! Prelude module for `purepng`.
//!
//! This module provides a convenient way to import commonly used types.
//!
//! # Examples
//!
//! ```no_run
//! use purepng::prelude::*;
//!
//! let image = Image::open("photo.png")?;
//! println!("{}", image.header());
//! # Ok::<(), purepng::PngError>(())
//! ```

#[doc(inline)]
pub use crate::{
	// Image model
	BitDepth,
	ColorType,
	// Compression
	CompressionLevel,

	// Encoding
	EncodeOptions,
	FilterStrategy,
	FilterType,
	// Errors
	FlateError,

	Header,
	Image,
	Interlace,

	Palette,
	PaletteEntry,
	PngError,

	// Streaming
	StreamDecoder,
	StreamEncoder,

	decode,
	encode,
	encode_raw,
	max_encoded_size,
};
