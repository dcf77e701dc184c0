//! Owner of the single native engine instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use crate::error::{log_engine_error, EngineError};
use crate::native::{NativeEngine, RawInstance};

/// Native engine instance with at-most-once release.
///
/// Shared as `Arc<NativeHandle>` between the factory and everything it
/// creates. Native calls run under a read guard and release takes the
/// write guard, so no call can reach the engine after teardown.
pub struct NativeHandle {
    engine: Arc<dyn NativeEngine>,
    instance: RawInstance,
    released: RwLock<bool>,
    release_requested: AtomicBool,
}

impl NativeHandle {
    /// Start an engine instance with `args`.
    pub fn acquire(engine: Arc<dyn NativeEngine>, args: &[String]) -> Result<Self, EngineError> {
        debug!("[NativeHandle] acquire(args={:?})", args);

        let instance = engine.init(args).ok_or_else(|| {
            let err = EngineError::Initialization {
                args: args.to_vec(),
            };
            log_engine_error(&err, "acquire");
            err
        })?;
        debug!("[NativeHandle] instance={:?}", instance);

        Ok(Self {
            engine,
            instance,
            released: RwLock::new(false),
            release_requested: AtomicBool::new(false),
        })
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    pub fn is_released(&self) -> bool {
        *self.released.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the live instance.
    ///
    /// Fails with `IllegalState` once the handle is released.
    pub fn with_instance<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&dyn NativeEngine, RawInstance) -> R,
    ) -> Result<R, EngineError> {
        let released = self.released.read().unwrap_or_else(PoisonError::into_inner);
        if *released {
            let err = EngineError::released("NativeHandle", operation);
            log_engine_error(&err, operation);
            return Err(err);
        }
        Ok(f(self.engine.as_ref(), self.instance))
    }

    /// Tear down the native instance.
    ///
    /// Returns true for the call that performed the teardown; every later
    /// call is a no-op returning false.
    pub fn release(&self) -> bool {
        let mut released = self.released.write().unwrap_or_else(PoisonError::into_inner);
        if *released {
            return false;
        }
        let _span = tracing::debug_span!("native_release", instance = self.instance.0).entered();
        self.engine.release(self.instance);
        *released = true;
        debug!("[NativeHandle] released instance {:?}", self.instance);
        true
    }

    /// Mark the release as wanted by the owner even if it has to wait for
    /// other holders to let go.
    pub(crate) fn request_release(&self) {
        self.release_requested.store(true, Ordering::SeqCst);
    }
}

impl Drop for NativeHandle {
    fn drop(&mut self) {
        if self.is_released() {
            return;
        }
        if self.release_requested.load(Ordering::SeqCst) {
            debug!(
                "[NativeHandle] Last holder gone, performing deferred release of {:?}",
                self.instance
            );
        } else {
            warn!(
                "[NativeHandle] Instance {:?} dropped without release, releasing from drop",
                self.instance
            );
        }
        self.release();
    }
}
