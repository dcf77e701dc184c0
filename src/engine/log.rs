//! Native log verbosity levels and the native log reader.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::handle::NativeHandle;
use crate::error::{log_engine_error, EngineError};
use crate::native::{LogMessage, RawLog};

/// Native log verbosity, ordered from most to least chatty.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Notice = 2,
    #[default]
    Warning = 3,
    Error = 4,
}

impl LogLevel {
    pub fn int_value(self) -> i32 {
        self as i32
    }

    /// Level for a native verbosity value, `None` outside 0-4.
    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Notice),
            3 => Some(LogLevel::Warning),
            4 => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Open reader over the native engine's message log.
///
/// Holds a share of the engine instance until closed. Closing is
/// idempotent; reading from a closed log fails with `IllegalState`.
pub struct EngineLog {
    raw: RawLog,
    handle: Mutex<Option<Arc<NativeHandle>>>,
    closed: AtomicBool,
}

impl EngineLog {
    pub(crate) fn open(handle: Arc<NativeHandle>) -> Result<Self, EngineError> {
        let raw = handle
            .with_instance("new_log", |engine, instance| engine.log_open(instance))?
            .ok_or_else(|| {
                let err = EngineError::LogOpenFailed;
                log_engine_error(&err, "new_log");
                err
            })?;
        debug!("[EngineLog] opened {:?}", raw);

        Ok(Self {
            raw,
            handle: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Messages buffered since the log was opened or last cleared.
    pub fn messages(&self) -> Result<Vec<LogMessage>, EngineError> {
        self.with_open("messages", |handle| handle.engine().log_messages(self.raw))
    }

    pub fn count(&self) -> Result<usize, EngineError> {
        self.with_open("count", |handle| handle.engine().log_count(self.raw))
    }

    pub fn clear(&self) -> Result<(), EngineError> {
        self.with_open("clear", |handle| handle.engine().log_clear(self.raw))
    }

    /// Close the native reader and give back the instance share.
    ///
    /// Returns true for the call that actually closed it.
    pub fn close(&self) -> bool {
        let mut guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(handle) = guard.take() else {
            return false;
        };
        handle.engine().log_close(self.raw);
        self.closed.store(true, Ordering::SeqCst);
        debug!("[EngineLog] closed {:?}", self.raw);
        drop(guard);
        // May perform a deferred engine release.
        drop(handle);
        true
    }

    fn with_open<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&NativeHandle) -> R,
    ) -> Result<R, EngineError> {
        let guard = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(handle) => Ok(f(handle.as_ref())),
            None => Err(EngineError::released("EngineLog", operation)),
        }
    }
}

impl Drop for EngineLog {
    fn drop(&mut self) {
        if !self.is_closed() {
            warn!("[EngineLog] {:?} dropped without close, closing from drop", self.raw);
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::StubEngine;

    #[test]
    fn test_warning_maps_to_three() {
        assert_eq!(LogLevel::Warning.int_value(), 3);
        assert_eq!(LogLevel::default(), LogLevel::Warning);
    }

    #[test]
    fn test_levels_from_int() {
        for level in [
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Notice,
            LogLevel::Warning,
            LogLevel::Error,
        ] {
            assert_eq!(LogLevel::from_int(level.int_value()), Some(level));
        }
        assert_eq!(LogLevel::from_int(5), None);
        assert_eq!(LogLevel::from_int(-1), None);
    }

    #[test]
    fn test_reads_survive_poisoned_handle_lock() {
        let engine = Arc::new(StubEngine::new());
        let handle = Arc::new(NativeHandle::acquire(engine, &[]).unwrap());
        let log = Arc::new(EngineLog::open(handle).unwrap());

        let poisoner = Arc::clone(&log);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.handle.lock().unwrap();
            panic!("poison the handle lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(log.handle.is_poisoned());

        assert_eq!(log.count().unwrap(), 0);
        assert!(log.clear().is_ok());
        assert!(log.close());
        assert!(log.count().unwrap_err().is_illegal_state());
    }

    #[test]
    fn test_level_serde_names() {
        let json = serde_json::to_string(&LogLevel::Notice).unwrap();
        assert_eq!(json, "\"notice\"");
        let parsed: LogLevel = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, LogLevel::Error);
    }
}
