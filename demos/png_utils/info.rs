//! Dump header, palette, and chunk layout of a PNG file

use anyhow::Context as _;
use log::{info, warn};
use purepng::png::chunk::ChunkReader;
use purepng::prelude::*;

pub(super) fn run(path: &str) -> anyhow::Result<()> {
	let data = std::fs::read(path).with_context(|| format!("reading {path}"))?;
	info!("{path}: {} bytes", data.len());

	if data.len() < 8 || data[..8] != purepng::SIGNATURE {
		warn!("{path} does not carry a PNG signature");
		anyhow::bail!("not a PNG file");
	}

	// Raw chunk layout before any semantic checks
	let mut reader = ChunkReader::new(&data[8..]);
	info!("chunk layout:");
	while let Some(chunk) = reader.next_chunk()? {
		info!(
			"  {} ({} bytes){}",
			chunk.chunk_type(),
			chunk.data().len(),
			if chunk.chunk_type().is_ancillary() {
				" [ancillary]"
			} else {
				""
			}
		);
	}

	let image = decode(&data).with_context(|| format!("decoding {path}"))?;
	info!("{}", image.header());
	info!("header as JSON: {}", serde_json::to_string(image.header())?);

	if let Some(palette) = image.palette() {
		info!("{}", palette);
		for (index, entry) in palette.entries().iter().enumerate().take(8) {
			info!("  [{index}] {entry} #{}", hex::encode([entry.r, entry.g, entry.b]));
		}
		if palette.len() > 8 {
			info!("  ... {} more entries", palette.len() - 8);
		}
	}

	info!("decoded pixel buffer: {} bytes", image.pixels().len());
	Ok(())
}
