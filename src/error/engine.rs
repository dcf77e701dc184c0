// Engine lifecycle error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Engine error code constants
///
/// Single source of truth for the numeric codes reported by [`EngineError`].
///
/// Error code range: 3001-3005
pub struct EngineErrorCodes {}

impl EngineErrorCodes {
    /// Native engine initialisation returned no instance
    pub const INITIALIZATION: i32 = 3001;

    /// Host platform matched none of the player variants
    pub const UNSUPPORTED_PLATFORM: i32 = 3002;

    /// Operation invoked on a released object
    pub const ILLEGAL_STATE: i32 = 3003;

    /// Native engine refused to create a player for the platform binding
    pub const PLAYER_ATTACH_FAILED: i32 = 3004;

    /// Native engine refused to open a log reader
    pub const LOG_OPEN_FAILED: i32 = 3005;
}

/// Log an engine error with structured context
///
/// Mirrors the fields carried by the error itself (code, component,
/// message) so log scrapers can correlate with caller-visible failures.
pub fn log_engine_error(err: &EngineError, context: &str) {
    error!(
        "Engine error in {}: code={}, component=MediaEngine, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the factory, native handle, players and log readers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Native engine failed to start with the given argument list
    Initialization { args: Vec<String> },

    /// Host platform matched none of the player variants
    UnsupportedPlatform { os: String },

    /// Operation invoked after release
    IllegalState {
        component: &'static str,
        operation: &'static str,
    },

    /// Native engine returned no player for the platform binding
    PlayerAttachFailed { platform: String },

    /// Native engine returned no log reader
    LogOpenFailed,
}

impl EngineError {
    pub(crate) fn released(component: &'static str, operation: &'static str) -> Self {
        EngineError::IllegalState {
            component,
            operation,
        }
    }

    /// True for errors caused by calling into an already released object.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, EngineError::IllegalState { .. })
    }
}

impl ErrorCode for EngineError {
    fn code(&self) -> i32 {
        match self {
            EngineError::Initialization { .. } => EngineErrorCodes::INITIALIZATION,
            EngineError::UnsupportedPlatform { .. } => EngineErrorCodes::UNSUPPORTED_PLATFORM,
            EngineError::IllegalState { .. } => EngineErrorCodes::ILLEGAL_STATE,
            EngineError::PlayerAttachFailed { .. } => EngineErrorCodes::PLAYER_ATTACH_FAILED,
            EngineError::LogOpenFailed => EngineErrorCodes::LOG_OPEN_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            EngineError::Initialization { args } => format!(
                "Unable to initialise the native media engine with arguments {:?}, \
                 check the engine arguments and/or the native library installation",
                args
            ),
            EngineError::UnsupportedPlatform { os } => format!(
                "Unable to create a media player, \
                 failed to detect a supported operating system (host: {})",
                os
            ),
            EngineError::IllegalState {
                component,
                operation,
            } => format!("{} already released, cannot call {}()", component, operation),
            EngineError::PlayerAttachFailed { platform } => {
                format!("Native engine refused to create a {} media player", platform)
            }
            EngineError::LogOpenFailed => "Native engine refused to open a log reader".to_string(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EngineError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_codes() {
        assert_eq!(
            EngineError::Initialization { args: vec![] }.code(),
            EngineErrorCodes::INITIALIZATION
        );
        assert_eq!(
            EngineError::UnsupportedPlatform {
                os: "plan9".to_string()
            }
            .code(),
            EngineErrorCodes::UNSUPPORTED_PLATFORM
        );
        assert_eq!(
            EngineError::released("MediaPlayer", "play").code(),
            EngineErrorCodes::ILLEGAL_STATE
        );
        assert_eq!(
            EngineError::PlayerAttachFailed {
                platform: "unix".to_string()
            }
            .code(),
            EngineErrorCodes::PLAYER_ATTACH_FAILED
        );
        assert_eq!(
            EngineError::LogOpenFailed.code(),
            EngineErrorCodes::LOG_OPEN_FAILED
        );
    }

    #[test]
    fn test_initialization_message_names_arguments_and_guidance() {
        let err = EngineError::Initialization {
            args: vec!["--no-video".to_string(), "--bogus".to_string()],
        };
        let message = err.message();
        assert!(message.contains("--bogus"));
        assert!(message.contains("check the engine arguments"));
        assert!(message.contains("native library"));
    }

    #[test]
    fn test_illegal_state_message() {
        let err = EngineError::released("MediaPlayer", "pause");
        assert!(err.is_illegal_state());
        assert_eq!(err.message(), "MediaPlayer already released, cannot call pause()");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::LogOpenFailed;
        let display = format!("{}", err);
        assert!(display.contains("EngineError"));
        assert!(display.contains(&err.code().to_string()));
    }
}
