//! Integration tests for the `purepng` public API.

mod malformed;
mod roundtrip;
mod streaming;

/// Initializes logging for tests that trace their progress. Safe to call
/// from every test; only the first call wins.
pub(crate) fn init_logging() {
	let _ = env_logger::builder().is_test(true).try_init();
}
