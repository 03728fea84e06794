//! Tracing/logging setup shared by binaries and tests.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Human-readable logging captured by the test harness.
///
/// Returns `false` when a subscriber was already installed.
pub fn try_init_for_tests() -> bool {
    tracing::try_init_for_tests()
}

/// Tracing configuration (filters, layers).
pub mod tracing;
