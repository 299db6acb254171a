//! Tracing subscriber setup.
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! The filter is read from `POSTDECK_LOG` (same syntax as `RUST_LOG`) and
//! defaults to `info` for the postdeck crates.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "POSTDECK_LOG";
const DEFAULT_FILTER: &str = "postdeck=info,postdeck_core=info";

pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
