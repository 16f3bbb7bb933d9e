//! Generate a test pattern PNG

use log::info;
use purepng::prelude::*;

pub(super) fn run(path: &str) -> anyhow::Result<()> {
	let width = 256u32;
	let height = 256u32;
	let header = Header::new(width, height, BitDepth::Eight, ColorType::Rgb, Interlace::None)?;

	let mut pixels = Vec::with_capacity(header.pixel_buffer_len());
	for y in 0..height {
		for x in 0..width {
			pixels.push(x as u8);
			pixels.push(y as u8);
			pixels.push(((x ^ y) & 0xFF) as u8);
		}
	}

	let image = Image::new(header, pixels, None)?;
	image.save(path)?;
	info!("wrote {width}x{height} test pattern to {path}");
	Ok(())
}
