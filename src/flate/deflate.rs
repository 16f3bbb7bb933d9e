//! RFC 1951 deflate compression.
//!
//! [`CompressionLevel::Store`] emits raw stored blocks, split at the 65 535
//! byte field limit. Every other level runs the LZ77 tokenizer (search depth
//! set by the level) and emits a single Huffman block: Fastest and Fast
//! always use the fixed trees, Default and Best additionally build a
//! dynamic-tree candidate and pick whichever encoding is smaller by exact
//! bit count, header included.

use crate::bitstream::BitWriter;
use crate::flate::CompressionLevel;
use crate::flate::huffman::{
	self, HuffmanEncoder, lengths_from_frequencies,
};
use crate::flate::inflate::CODE_LENGTH_ORDER;
use crate::flate::lz77::{
	DIST_EXTRA, LENGTH_EXTRA, Matcher, distance_to_code, length_to_code,
};

/// Largest payload of a single stored block.
const STORED_BLOCK_LIMIT: usize = 65_535;

/// End-of-block symbol.
const EOB: usize = 256;

#[derive(Debug, Clone, Copy)]
enum Token {
	Literal(u8),
	Match {
		length: u16,
		distance: u16,
	},
}

/// Compresses `input` into a raw deflate stream.
pub fn deflate(input: &[u8], level: CompressionLevel) -> Vec<u8> {
	match level {
		CompressionLevel::Store => deflate_stored(input),
		_ => deflate_compressed(input, level),
	}
}

fn deflate_stored(input: &[u8]) -> Vec<u8> {
	let mut writer = BitWriter::new();
	if input.is_empty() {
		write_stored_block(&mut writer, &[], true);
		return writer.into_data();
	}

	let block_count = input.len().div_ceil(STORED_BLOCK_LIMIT);
	for (index, block) in input.chunks(STORED_BLOCK_LIMIT).enumerate() {
		write_stored_block(&mut writer, block, index + 1 == block_count);
	}
	writer.into_data()
}

fn write_stored_block(writer: &mut BitWriter, block: &[u8], bfinal: bool) {
	writer.write_bits(u32::from(bfinal), 1);
	writer.write_bits(0, 2);
	writer.flush();
	let len = block.len() as u16;
	writer.write_bytes(&len.to_le_bytes());
	writer.write_bytes(&(!len).to_le_bytes());
	writer.write_bytes(block);
}

fn tokenize(input: &[u8], max_chain: usize) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut matcher = Matcher::new(max_chain);
	let mut pos = 0;

	while pos < input.len() {
		if let Some(found) = matcher.find_match(input, pos) {
			tokens.push(Token::Match {
				length: found.length as u16,
				distance: found.distance as u16,
			});
			// Every position a match covers still enters the chains
			for covered in pos..pos + found.length {
				matcher.insert(input, covered);
			}
			pos += found.length;
		} else {
			matcher.insert(input, pos);
			tokens.push(Token::Literal(input[pos]));
			pos += 1;
		}
	}

	tokens
}

/// Bit cost of the block body (tokens + end-of-block) under the given code
/// lengths.
fn body_bits(tokens: &[Token], lit_lengths: &[u8], dist_lengths: &[u8]) -> usize {
	let mut bits = usize::from(lit_lengths[EOB]);
	for token in tokens {
		match *token {
			Token::Literal(byte) => bits += usize::from(lit_lengths[usize::from(byte)]),
			Token::Match {
				length,
				distance,
			} => {
				let (len_code, _) = length_to_code(usize::from(length));
				bits += usize::from(lit_lengths[257 + len_code])
					+ usize::from(LENGTH_EXTRA[len_code]);
				let (dist_code, _) = distance_to_code(usize::from(distance));
				bits += usize::from(dist_lengths[dist_code]) + usize::from(DIST_EXTRA[dist_code]);
			}
		}
	}
	bits
}

fn write_tokens(
	writer: &mut BitWriter,
	tokens: &[Token],
	lit: &HuffmanEncoder,
	dist: &HuffmanEncoder,
) {
	for token in tokens {
		match *token {
			Token::Literal(byte) => lit.write_symbol(writer, usize::from(byte)),
			Token::Match {
				length,
				distance,
			} => {
				let (len_code, len_extra) = length_to_code(usize::from(length));
				lit.write_symbol(writer, 257 + len_code);
				writer.write_bits(len_extra, u32::from(LENGTH_EXTRA[len_code]));
				let (dist_code, dist_extra) = distance_to_code(usize::from(distance));
				dist.write_symbol(writer, dist_code);
				writer.write_bits(dist_extra, u32::from(DIST_EXTRA[dist_code]));
			}
		}
	}
	lit.write_symbol(writer, EOB);
}

/// One opcode of the compressed code-length stream (RFC 1951 §3.2.7).
#[derive(Debug, Clone, Copy)]
enum ClOp {
	/// A literal code length 0..=15.
	Len(u8),
	/// Opcode 16: repeat the previous length 3..=6 times.
	Repeat(u8),
	/// Opcode 17: a run of 3..=10 zeros.
	ZeroShort(u8),
	/// Opcode 18: a run of 11..=138 zeros.
	ZeroLong(u8),
}

fn rle_code_lengths(lengths: &[u8]) -> Vec<ClOp> {
	let mut ops = Vec::new();
	let mut index = 0;
	while index < lengths.len() {
		let value = lengths[index];
		let mut run = 1;
		while index + run < lengths.len() && lengths[index + run] == value {
			run += 1;
		}

		let mut left = run;
		if value == 0 {
			while left >= 11 {
				let take = left.min(138);
				ops.push(ClOp::ZeroLong(take as u8));
				left -= take;
			}
			if left >= 3 {
				ops.push(ClOp::ZeroShort(left as u8));
				left = 0;
			}
			while left > 0 {
				ops.push(ClOp::Len(0));
				left -= 1;
			}
		} else {
			ops.push(ClOp::Len(value));
			left -= 1;
			while left >= 3 {
				let take = left.min(6);
				ops.push(ClOp::Repeat(take as u8));
				left -= take;
			}
			while left > 0 {
				ops.push(ClOp::Len(value));
				left -= 1;
			}
		}

		index += run;
	}
	ops
}

struct DynamicPlan {
	lit_lengths: Vec<u8>,
	dist_lengths: Vec<u8>,
	cl_lengths: [u8; 19],
	cl_ops: Vec<ClOp>,
	hclen: usize,
	header_bits: usize,
}

fn build_dynamic_plan(lit_freq: &[u32; 286], dist_freq: &[u32; 30]) -> DynamicPlan {
	let lit_all = lengths_from_frequencies(lit_freq, huffman::MAX_CODE_BITS);
	let mut dist_all = lengths_from_frequencies(dist_freq, huffman::MAX_CODE_BITS);
	if dist_all.iter().all(|&len| len == 0) {
		// HDIST is at least 1; give code 0 a dummy length rather than
		// transmit an empty distance tree
		dist_all[0] = 1;
	}

	let hlit = lit_all
		.iter()
		.rposition(|&len| len > 0)
		.map_or(257, |last| (last + 1).max(257));
	let hdist = dist_all.iter().rposition(|&len| len > 0).map_or(1, |last| (last + 1).max(1));

	let lit_lengths = lit_all[..hlit].to_vec();
	let dist_lengths = dist_all[..hdist].to_vec();

	let mut combined = Vec::with_capacity(hlit + hdist);
	combined.extend_from_slice(&lit_lengths);
	combined.extend_from_slice(&dist_lengths);
	let cl_ops = rle_code_lengths(&combined);

	let mut cl_freq = [0u32; 19];
	for op in &cl_ops {
		match *op {
			ClOp::Len(value) => cl_freq[usize::from(value)] += 1,
			ClOp::Repeat(_) => cl_freq[16] += 1,
			ClOp::ZeroShort(_) => cl_freq[17] += 1,
			ClOp::ZeroLong(_) => cl_freq[18] += 1,
		}
	}
	let cl_lengths_vec = lengths_from_frequencies(&cl_freq, 7);
	let mut cl_lengths = [0u8; 19];
	cl_lengths.copy_from_slice(&cl_lengths_vec);

	let hclen = CODE_LENGTH_ORDER
		.iter()
		.rposition(|&slot| cl_lengths[slot] > 0)
		.map_or(4, |last| (last + 1).max(4));

	let mut header_bits = 5 + 5 + 4 + 3 * hclen;
	for op in &cl_ops {
		header_bits += match *op {
			ClOp::Len(value) => usize::from(cl_lengths[usize::from(value)]),
			ClOp::Repeat(_) => usize::from(cl_lengths[16]) + 2,
			ClOp::ZeroShort(_) => usize::from(cl_lengths[17]) + 3,
			ClOp::ZeroLong(_) => usize::from(cl_lengths[18]) + 7,
		};
	}

	DynamicPlan {
		lit_lengths,
		dist_lengths,
		cl_lengths,
		cl_ops,
		hclen,
		header_bits,
	}
}

fn write_dynamic_header(writer: &mut BitWriter, plan: &DynamicPlan) {
	let cl_encoder =
		HuffmanEncoder::from_lengths(&plan.cl_lengths).expect("code-length tree is Kraft-complete");

	writer.write_bits((plan.lit_lengths.len() - 257) as u32, 5);
	writer.write_bits((plan.dist_lengths.len() - 1) as u32, 5);
	writer.write_bits((plan.hclen - 4) as u32, 4);
	for &slot in CODE_LENGTH_ORDER.iter().take(plan.hclen) {
		writer.write_bits(u32::from(plan.cl_lengths[slot]), 3);
	}
	for op in &plan.cl_ops {
		match *op {
			ClOp::Len(value) => cl_encoder.write_symbol(writer, usize::from(value)),
			ClOp::Repeat(count) => {
				cl_encoder.write_symbol(writer, 16);
				writer.write_bits(u32::from(count) - 3, 2);
			}
			ClOp::ZeroShort(count) => {
				cl_encoder.write_symbol(writer, 17);
				writer.write_bits(u32::from(count) - 3, 3);
			}
			ClOp::ZeroLong(count) => {
				cl_encoder.write_symbol(writer, 18);
				writer.write_bits(u32::from(count) - 11, 7);
			}
		}
	}
}

fn deflate_compressed(input: &[u8], level: CompressionLevel) -> Vec<u8> {
	let tokens = tokenize(input, level.max_chain_length());

	let mut lit_freq = [0u32; 286];
	let mut dist_freq = [0u32; 30];
	lit_freq[EOB] = 1;
	for token in &tokens {
		match *token {
			Token::Literal(byte) => lit_freq[usize::from(byte)] += 1,
			Token::Match {
				length,
				distance,
			} => {
				let (len_code, _) = length_to_code(usize::from(length));
				lit_freq[257 + len_code] += 1;
				let (dist_code, _) = distance_to_code(usize::from(distance));
				dist_freq[dist_code] += 1;
			}
		}
	}

	let fixed_lit = huffman::fixed_litlen_lengths();
	let fixed_dist = huffman::fixed_dist_lengths();
	let fixed_bits = body_bits(&tokens, &fixed_lit, &fixed_dist);

	let dynamic_plan = match level {
		CompressionLevel::Default | CompressionLevel::Best => {
			let plan = build_dynamic_plan(&lit_freq, &dist_freq);
			let total = plan.header_bits + body_bits(&tokens, &plan.lit_lengths, &plan.dist_lengths);
			(total < fixed_bits).then_some(plan)
		}
		_ => None,
	};

	let mut writer = BitWriter::new();
	writer.write_bits(1, 1); // single block, BFINAL
	if let Some(plan) = dynamic_plan {
		writer.write_bits(2, 2);
		write_dynamic_header(&mut writer, &plan);
		let lit = HuffmanEncoder::from_lengths(&plan.lit_lengths)
			.expect("literal lengths are Kraft-complete");
		let dist = HuffmanEncoder::from_lengths(&plan.dist_lengths)
			.expect("distance lengths are Kraft-complete");
		write_tokens(&mut writer, &tokens, &lit, &dist);
	} else {
		writer.write_bits(1, 2);
		write_tokens(
			&mut writer,
			&tokens,
			huffman::fixed_litlen_encoder(),
			huffman::fixed_dist_encoder(),
		);
	}
	writer.into_data()
}
