//! Tracing setup shared by the two binaries.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, mapping `-v` counts to a default filter
/// level. An explicit `RUST_LOG` wins over the flag.
pub fn init(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
