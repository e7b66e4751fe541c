//! Process-wide tracing setup for crewplan binaries and tests.

/// Initialize tracing with the format picked by `CREWPLAN_LOG_FORMAT`
/// (`json`, the default, or `compact`) and the filter from `RUST_LOG`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, formats).
pub mod tracing;

pub use self::tracing::LogFormat;
