//! Process-wide logging setup for binaries and services embedding the entity layer.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{DEFAULT_FILTER, init_with_filter};

/// Initialize process-wide tracing/logging from `RUST_LOG`.
///
/// Safe to call multiple times; subsequent calls are no-ops and return `false`.
pub fn init() -> bool {
    tracing::init()
}
