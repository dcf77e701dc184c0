// Error types for the media player core
//
// One module per error domain: engine lifecycle (factory, handle, players,
// log readers) and listener dispatch. Every error carries a stable numeric
// code via the ErrorCode trait.

mod dispatch;
mod engine;

pub use dispatch::{log_dispatch_error, ListenerDispatchError, LISTENER_DISPATCH_FAILED};
pub use engine::{log_engine_error, EngineError, EngineErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
