//! Engine module owning the native instance.
//!
//! `handle` enforces at-most-once native release, `factory` is the entry
//! point callers construct, `host` picks the player variant for a platform
//! and `log` exposes verbosity levels and the native log reader.

mod factory;
mod handle;
mod host;
mod log;

pub use self::factory::{EngineFactory, DEFAULT_LOG_LEVEL};
pub use self::handle::NativeHandle;
pub use self::host::{select_platform, HostTraits, Platform, PLATFORM_RULES};
pub use self::log::{EngineLog, LogLevel};
