//! PNG scanline filters.
//!
//! Each scanline on the wire is preceded by a selector byte choosing one of
//! five predictors. Predictions use `a` (the byte one filter unit to the
//! left), `b` (same column, previous row), and `c` (previous row, one unit
//! left); absent neighbors read as zero, so the first row and the leading
//! bytes of every row need no special casing beyond that. The filter unit
//! is bytes-per-pixel, or 1 for sub-byte packed formats — filtering always
//! operates on packed bytes, never individual pixels.

use std::fmt::Display;

use crate::error::PngError;

/// Scanline filter selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
	/// No prediction.
	None = 0,
	/// Predict from the left neighbor.
	Sub = 1,
	/// Predict from the row above.
	Up = 2,
	/// Predict from the floor-average of left and above.
	Average = 3,
	/// Predict with the Paeth function of left, above, and upper-left.
	Paeth = 4,
}

impl FilterType {
	/// All five filters, in selector order.
	pub const ALL: [FilterType; 5] = [
		FilterType::None,
		FilterType::Sub,
		FilterType::Up,
		FilterType::Average,
		FilterType::Paeth,
	];

	/// Parses a filter selector byte.
	pub fn from_u8(value: u8) -> Result<Self, PngError> {
		match value {
			0 => Ok(FilterType::None),
			1 => Ok(FilterType::Sub),
			2 => Ok(FilterType::Up),
			3 => Ok(FilterType::Average),
			4 => Ok(FilterType::Paeth),
			other => Err(PngError::InvalidFilterType(other)),
		}
	}
}

impl Display for FilterType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FilterType::None => write!(f, "None"),
			FilterType::Sub => write!(f, "Sub"),
			FilterType::Up => write!(f, "Up"),
			FilterType::Average => write!(f, "Average"),
			FilterType::Paeth => write!(f, "Paeth"),
		}
	}
}

/// Filter choice strategy for the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterStrategy {
	/// Always the None filter.
	None,
	/// Always Sub.
	Sub,
	/// Always Up.
	Up,
	/// Always Average.
	Average,
	/// Always Paeth.
	Paeth,
	/// Per row, the filter minimizing the sum of absolute filtered values.
	#[default]
	Adaptive,
}

impl FilterStrategy {
	/// The fixed filter this strategy always picks, if it is not adaptive.
	pub fn fixed_filter(self) -> Option<FilterType> {
		match self {
			FilterStrategy::None => Some(FilterType::None),
			FilterStrategy::Sub => Some(FilterType::Sub),
			FilterStrategy::Up => Some(FilterType::Up),
			FilterStrategy::Average => Some(FilterType::Average),
			FilterStrategy::Paeth => Some(FilterType::Paeth),
			FilterStrategy::Adaptive => None,
		}
	}
}

/// The Paeth predictor: whichever of `a`, `b`, `c` is closest to
/// `a + b - c`, ties preferring `a`, then `b`.
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
	let p = i32::from(a) + i32::from(b) - i32::from(c);
	let pa = (p - i32::from(a)).abs();
	let pb = (p - i32::from(b)).abs();
	let pc = (p - i32::from(c)).abs();
	if pa <= pb && pa <= pc {
		a
	} else if pb <= pc {
		b
	} else {
		c
	}
}

/// Reverses `filter` on `row` in place.
///
/// `prev` is the already reconstructed previous row (`None` for row 0);
/// `unit` is the filter unit in bytes.
pub fn unfilter_row(filter: FilterType, row: &mut [u8], prev: Option<&[u8]>, unit: usize) {
	debug_assert!(prev.is_none_or(|p| p.len() >= row.len()));
	match filter {
		FilterType::None => {}
		FilterType::Sub => {
			for i in unit..row.len() {
				row[i] = row[i].wrapping_add(row[i - unit]);
			}
		}
		FilterType::Up => {
			if let Some(prev) = prev {
				for i in 0..row.len() {
					row[i] = row[i].wrapping_add(prev[i]);
				}
			}
		}
		FilterType::Average => {
			for i in 0..row.len() {
				let a = if i >= unit {
					u16::from(row[i - unit])
				} else {
					0
				};
				let b = prev.map_or(0, |p| u16::from(p[i]));
				// The sum needs 9 bits before the floor divide
				row[i] = row[i].wrapping_add(((a + b) / 2) as u8);
			}
		}
		FilterType::Paeth => {
			for i in 0..row.len() {
				let a = if i >= unit {
					row[i - unit]
				} else {
					0
				};
				let b = prev.map_or(0, |p| p[i]);
				let c = if i >= unit {
					prev.map_or(0, |p| p[i - unit])
				} else {
					0
				};
				row[i] = row[i].wrapping_add(paeth_predictor(a, b, c));
			}
		}
	}
}

/// Applies `filter` to `src`, writing the filtered bytes to `out`.
pub fn filter_row(filter: FilterType, src: &[u8], prev: Option<&[u8]>, unit: usize, out: &mut [u8]) {
	debug_assert!(out.len() == src.len());
	match filter {
		FilterType::None => out.copy_from_slice(src),
		FilterType::Sub => {
			for i in 0..src.len() {
				let a = if i >= unit {
					src[i - unit]
				} else {
					0
				};
				out[i] = src[i].wrapping_sub(a);
			}
		}
		FilterType::Up => {
			for i in 0..src.len() {
				let b = prev.map_or(0, |p| p[i]);
				out[i] = src[i].wrapping_sub(b);
			}
		}
		FilterType::Average => {
			for i in 0..src.len() {
				let a = if i >= unit {
					u16::from(src[i - unit])
				} else {
					0
				};
				let b = prev.map_or(0, |p| u16::from(p[i]));
				out[i] = src[i].wrapping_sub(((a + b) / 2) as u8);
			}
		}
		FilterType::Paeth => {
			for i in 0..src.len() {
				let a = if i >= unit {
					src[i - unit]
				} else {
					0
				};
				let b = prev.map_or(0, |p| p[i]);
				let c = if i >= unit {
					prev.map_or(0, |p| p[i - unit])
				} else {
					0
				};
				out[i] = src[i].wrapping_sub(paeth_predictor(a, b, c));
			}
		}
	}
}

/// Sum of absolute filtered values, bytes taken as signed.
fn filter_score(filtered: &[u8]) -> u64 {
	filtered.iter().map(|&b| u64::from((b as i8).unsigned_abs())).sum()
}

/// Filters `src` per `strategy`, writing the winner to `out` and returning
/// its selector.
///
/// `scratch` is a caller-owned row-sized buffer used to evaluate the five
/// candidates in adaptive mode; the encoder allocates it once and reuses it
/// across rows.
pub fn apply_filter(
	strategy: FilterStrategy,
	src: &[u8],
	prev: Option<&[u8]>,
	unit: usize,
	scratch: &mut [u8],
	out: &mut [u8],
) -> FilterType {
	if let Some(fixed) = strategy.fixed_filter() {
		filter_row(fixed, src, prev, unit, out);
		return fixed;
	}

	let mut best = FilterType::None;
	let mut best_score = u64::MAX;
	for filter in FilterType::ALL {
		filter_row(filter, src, prev, unit, scratch);
		let score = filter_score(scratch);
		if score < best_score {
			best_score = score;
			best = filter;
		}
	}
	filter_row(best, src, prev, unit, out);
	best
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_paeth_returns_a_neighbor() {
		for a in [0u8, 1, 127, 128, 255] {
			for b in [0u8, 3, 200, 255] {
				for c in [0u8, 7, 130, 255] {
					let p = paeth_predictor(a, b, c);
					assert!(p == a || p == b || p == c);
				}
			}
		}
	}

	#[test]
	fn test_paeth_equal_neighbors() {
		for v in [0u8, 42, 255] {
			assert_eq!(paeth_predictor(v, v, v), v);
		}
	}

	#[test]
	fn test_paeth_tie_prefers_a_then_b() {
		// p = a + b - c; with b == c the prediction is a
		assert_eq!(paeth_predictor(9, 5, 5), 9);
		// with a == c the prediction is b
		assert_eq!(paeth_predictor(5, 9, 5), 9);
	}

	fn roundtrip_all_filters(src: &[u8], prev: Option<&[u8]>, unit: usize) {
		for filter in FilterType::ALL {
			let mut filtered = vec![0u8; src.len()];
			filter_row(filter, src, prev, unit, &mut filtered);
			unfilter_row(filter, &mut filtered, prev, unit);
			assert_eq!(filtered, src, "filter {filter} did not invert");
		}
	}

	#[test]
	fn test_filter_unfilter_inverse_first_row() {
		let src = [12u8, 250, 0, 99, 128, 7, 255, 1];
		roundtrip_all_filters(&src, None, 3);
	}

	#[test]
	fn test_filter_unfilter_inverse_with_prev() {
		let prev = [200u8, 1, 17, 93, 255, 0, 45, 128];
		let src = [12u8, 250, 0, 99, 128, 7, 255, 1];
		roundtrip_all_filters(&src, Some(&prev), 1);
		roundtrip_all_filters(&src, Some(&prev), 2);
		roundtrip_all_filters(&src, Some(&prev), 4);
	}

	#[test]
	fn test_from_u8_rejects_out_of_range() {
		assert!(matches!(FilterType::from_u8(5), Err(PngError::InvalidFilterType(5))));
		for v in 0..=4u8 {
			assert_eq!(FilterType::from_u8(v).unwrap() as u8, v);
		}
	}

	#[test]
	fn test_sub_filters_gradient_to_constant() {
		// A linear ramp becomes a constant row under Sub
		let src: Vec<u8> = (0..32u8).map(|i| i * 3).collect();
		let mut out = vec![0u8; src.len()];
		filter_row(FilterType::Sub, &src, None, 1, &mut out);
		assert!(out[1..].iter().all(|&b| b == 3));
	}

	#[test]
	fn test_adaptive_beats_none_on_gradient() {
		let src: Vec<u8> = (0..64u8).map(|i| i * 2).collect();
		let mut scratch = vec![0u8; src.len()];
		let mut out = vec![0u8; src.len()];
		let chosen = apply_filter(FilterStrategy::Adaptive, &src, None, 1, &mut scratch, &mut out);
		assert_ne!(chosen, FilterType::None);
		// The selected output must still invert
		let mut restored = out.clone();
		unfilter_row(chosen, &mut restored, None, 1);
		assert_eq!(restored, src);
	}

	#[test]
	fn test_fixed_strategy_is_honored() {
		let src = [9u8; 16];
		let prev = [3u8; 16];
		let mut scratch = vec![0u8; 16];
		let mut out = vec![0u8; 16];
		let chosen =
			apply_filter(FilterStrategy::Up, &src, Some(&prev), 1, &mut scratch, &mut out);
		assert_eq!(chosen, FilterType::Up);
		assert!(out.iter().all(|&b| b == 6));
	}
}
