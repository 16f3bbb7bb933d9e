//! PNG inspection and conversion utilities for `purepng`

mod generate;
mod info;
mod roundtrip;

fn main() -> anyhow::Result<()> {
	// Initialize logger with default level set to info if RUST_LOG is not set
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let args: Vec<String> = std::env::args().collect();
	if args.len() > 1 {
		match args[1].as_str() {
			"info" => {
				let Some(path) = args.get(2) else {
					anyhow::bail!("usage: png-utils info <file.png>");
				};
				info::run(path)?;
			}
			"roundtrip" => {
				let Some(path) = args.get(2) else {
					anyhow::bail!("usage: png-utils roundtrip <file.png>");
				};
				roundtrip::run(path)?;
			}
			"gen" => {
				let path = args.get(2).map_or("test_pattern.png", String::as_str);
				generate::run(path)?;
			}
			other => {
				println!("Unknown command: {other}");
				println!("Available commands: info, roundtrip, gen");
			}
		}
	} else {
		println!("Available commands: info, roundtrip, gen");
		println!("Usage: cargo run --example png-utils -- <command> [file]");
	}

	Ok(())
}
