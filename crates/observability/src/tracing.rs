//! Tracing/logging initialization.
//!
//! Filtering is driven by `RUST_LOG`; authorization decisions log under the
//! `rulegate_auth` target (`debug` for grants, `info` for denials).

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}

pub fn try_init_for_tests() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("rulegate_auth=debug,warn"))
        .with_test_writer()
        .try_init()
        .is_ok()
}
