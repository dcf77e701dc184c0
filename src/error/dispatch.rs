// Listener dispatch error type

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Code reported by every [`ListenerDispatchError`].
pub const LISTENER_DISPATCH_FAILED: i32 = 4001;

/// Log a listener failure without interrupting the fan-out loop.
pub fn log_dispatch_error(err: &ListenerDispatchError) {
    error!(
        "Listener error in dispatch: code={}, component=EventListenerRegistry, message={}",
        err.code(),
        err.message()
    );
}

/// A single listener panicked while handling an event.
///
/// Never propagated to the caller that raised the event; the registry
/// records it and moves on to the next listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerDispatchError {
    /// Player whose event was being delivered
    pub player_id: u64,
    /// Position of the failing registration at dispatch time
    pub listener_index: usize,
    /// Event kind, e.g. `time_changed`
    pub event: &'static str,
    /// Panic payload rendered as text
    pub reason: String,
}

impl ListenerDispatchError {
    /// Render a `catch_unwind` payload into a readable reason.
    pub fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        }
    }
}

impl ErrorCode for ListenerDispatchError {
    fn code(&self) -> i32 {
        LISTENER_DISPATCH_FAILED
    }

    fn message(&self) -> String {
        format!(
            "listener #{} failed handling {} for player {}: {}",
            self.listener_index, self.event, self.player_id, self.reason
        )
    }
}

impl fmt::Display for ListenerDispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ListenerDispatchError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ListenerDispatchError {}
