//! Re-encode a PNG at every compression level and verify pixel identity

use anyhow::Context as _;
use log::info;
use purepng::prelude::*;

pub(super) fn run(path: &str) -> anyhow::Result<()> {
	let data = std::fs::read(path).with_context(|| format!("reading {path}"))?;
	let image = decode(&data).with_context(|| format!("decoding {path}"))?;
	info!("{path}: {}x{} {}", image.header().width(), image.header().height(), image.header().color_type());

	for level in [
		CompressionLevel::Store,
		CompressionLevel::Fastest,
		CompressionLevel::Fast,
		CompressionLevel::Default,
		CompressionLevel::Best,
	] {
		let options = EncodeOptions {
			compression_level: level,
			filter_strategy: FilterStrategy::Adaptive,
		};
		let encoded = encode(&image, &options)?;
		let reloaded = decode(&encoded)?;
		anyhow::ensure!(
			reloaded.pixels() == image.pixels(),
			"pixel mismatch after re-encode at {level}"
		);
		info!(
			"{level}: {} bytes ({:.1}% of original)",
			encoded.len(),
			encoded.len() as f64 * 100.0 / data.len() as f64
		);
	}

	Ok(())
}
