//! Process-wide log output.
//!
//! The crate logs through the `log` facade. These helpers install a
//! `tracing-subscriber` formatter, which also picks up `log` records, so
//! binaries and integration tests see both.

use tracing::Level;

/// Install the formatter at INFO. Safe to call more than once.
pub fn init_logging() {
    init_logging_at(Level::INFO);
}

/// Install the formatter at `level`.
///
/// Returns false if a global subscriber was already installed.
pub fn init_logging_at(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
