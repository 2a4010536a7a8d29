//! Diagnostic logging setup.
//!
//! Log lines go to stderr so they never mix with rendered output on stdout.
//! `RUST_LOG` wins over the verbosity flag when it is set.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter directive for a `-v` count
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)));

    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
