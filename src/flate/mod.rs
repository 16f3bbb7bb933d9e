//! RFC 1950/1951 compression support.
//!
//! This module implements the whole deflate stack used by the PNG codec:
//!
//! - [`huffman`]: canonical Huffman decode tables and encoders
//! - [`lz77`]: the hash-chain match finder and the RFC 1951 §3.2.5
//!   length/distance code tables
//! - [`inflate`]: the block-driven decompressor
//! - [`deflate`]: the compressor (stored, fixed, and dynamic blocks)
//! - [`zlib`]: RFC 1950 framing with the Adler-32 trailer
//!
//! The engines are self-contained and usable independently of the PNG layer.

pub mod deflate;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod zlib;

use std::fmt::Display;

pub use deflate::deflate;
pub use inflate::{inflate, inflate_partial};

/// Compression effort levels.
///
/// The level controls the LZ77 hash-chain search depth and, at
/// [`CompressionLevel::Store`], switches the encoder to raw stored blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionLevel {
	/// No compression: stored blocks only.
	Store,
	/// Minimal match search.
	Fastest,
	/// Shallow match search.
	Fast,
	/// Balanced search depth.
	#[default]
	Default,
	/// Deepest match search.
	Best,
}

impl CompressionLevel {
	/// Maximum hash-chain positions examined per match attempt.
	pub fn max_chain_length(self) -> usize {
		match self {
			CompressionLevel::Store => 0,
			CompressionLevel::Fastest => 4,
			CompressionLevel::Fast => 16,
			CompressionLevel::Default => 64,
			CompressionLevel::Best => 256,
		}
	}

	/// The FLEVEL hint stored in the zlib FLG byte.
	pub fn flevel(self) -> u8 {
		match self {
			CompressionLevel::Store => 0,
			CompressionLevel::Fastest | CompressionLevel::Fast => 1,
			CompressionLevel::Default => 2,
			CompressionLevel::Best => 3,
		}
	}
}

impl Display for CompressionLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CompressionLevel::Store => write!(f, "Store"),
			CompressionLevel::Fastest => write!(f, "Fastest"),
			CompressionLevel::Fast => write!(f, "Fast"),
			CompressionLevel::Default => write!(f, "Default"),
			CompressionLevel::Best => write!(f, "Best"),
		}
	}
}
