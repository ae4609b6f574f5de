//! Test logging utilities.
//!
//! Provides utilities for initializing logging in test environments.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize logging for tests (call once)
///
/// Installs a `tracing_subscriber` fmt subscriber that writes through the
/// test harness, so output is captured per test. The level is read from
/// `RUST_LOG` and defaults to `debug` for the chocolate crates.
///
/// # Examples
///
/// ```
/// use chocolate_test::logging::init_test_logging;
///
/// // In your test:
/// init_test_logging();
/// // Your test code
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new("chocolate_core=debug,chocolate_rest=debug"));
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_test_writer()
			.try_init();
	});
}
