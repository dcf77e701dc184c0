//! EngineFactory: entry point owning the engine instance.
//!
//! The factory starts the native engine, applies verbosity and identity,
//! and builds players and log readers that share its instance.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};

use crate::config::{EventsConfig, FactoryConfig};
use crate::engine::handle::NativeHandle;
use crate::engine::host::{select_platform, HostTraits};
use crate::engine::log::{EngineLog, LogLevel};
use crate::error::{log_engine_error, EngineError};
use crate::native::{NativeEngine, RawInstance};
use crate::player::{variant_for, FullScreenStrategy, MediaPlayer};

/// Verbosity applied right after the engine starts.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warning;

/// Factory for media players over one native engine instance.
///
/// # Release
///
/// Players and log readers hold a share of the instance. `release` gives
/// up the factory's share: the native instance is torn down right away if
/// nothing else holds it, otherwise when the last player or log lets go.
/// Either way the native release happens exactly once.
pub struct EngineFactory {
    handle: Mutex<Option<Arc<NativeHandle>>>,
    events: EventsConfig,
}

impl EngineFactory {
    /// Start the engine with `args` and apply the default verbosity.
    ///
    /// Fails with `EngineError::Initialization` when the engine refuses to
    /// start; no factory exists in that case.
    pub fn new(engine: Arc<dyn NativeEngine>, args: &[String]) -> Result<Self, EngineError> {
        Self::with_events(engine, args, EventsConfig::default())
    }

    /// Build a factory from loaded configuration.
    pub fn from_config(
        engine: Arc<dyn NativeEngine>,
        config: &FactoryConfig,
    ) -> Result<Self, EngineError> {
        let factory = Self::with_events(engine, &config.engine_args, config.events.clone())?;
        if config.log_level != DEFAULT_LOG_LEVEL {
            factory.set_log_level(config.log_level)?;
        }
        if let Some(identity) = &config.identity {
            factory.set_identity(&identity.app_name, identity.http_app_name.as_deref())?;
        }
        Ok(factory)
    }

    fn with_events(
        engine: Arc<dyn NativeEngine>,
        args: &[String],
        events: EventsConfig,
    ) -> Result<Self, EngineError> {
        let handle = NativeHandle::acquire(engine, args)?;
        handle.with_instance("new", |engine, instance| {
            engine.set_log_verbosity(instance, DEFAULT_LOG_LEVEL.int_value())
        })?;
        info!(
            "[EngineFactory] Engine started (args={:?}, verbosity={})",
            args, DEFAULT_LOG_LEVEL
        );

        Ok(Self {
            handle: Mutex::new(Some(Arc::new(handle))),
            events,
        })
    }

    // ========================================================================
    // ENGINE SETTINGS
    // ========================================================================

    /// Set the application name, and optionally the HTTP user agent, the
    /// engine reports to remote services.
    pub fn set_identity(
        &self,
        app_name: &str,
        http_app_name: Option<&str>,
    ) -> Result<(), EngineError> {
        info!(
            "[EngineFactory] set_identity(app_name={}, http_app_name={:?})",
            app_name, http_app_name
        );
        self.with_instance("set_identity", |engine, instance| {
            engine.set_user_agent(instance, app_name, http_app_name)
        })
    }

    pub fn set_log_level(&self, level: LogLevel) -> Result<(), EngineError> {
        info!("[EngineFactory] set_log_level({})", level);
        self.with_instance("set_log_level", |engine, instance| {
            engine.set_log_verbosity(instance, level.int_value())
        })
    }

    /// Current native verbosity as reported by the engine.
    pub fn log_verbosity(&self) -> Result<i32, EngineError> {
        self.with_instance("log_verbosity", |engine, instance| {
            engine.log_verbosity(instance)
        })
    }

    // ========================================================================
    // CONSTRUCTION
    // ========================================================================

    /// New player for the host this process runs on.
    pub fn new_player(
        &self,
        full_screen: Arc<dyn FullScreenStrategy>,
    ) -> Result<MediaPlayer, EngineError> {
        self.new_player_for(HostTraits::current(), full_screen)
    }

    /// New player for an explicitly described host.
    pub fn new_player_for(
        &self,
        host: &HostTraits,
        full_screen: Arc<dyn FullScreenStrategy>,
    ) -> Result<MediaPlayer, EngineError> {
        let handle = self.shared_handle("new_player")?;
        let platform = select_platform(host).ok_or_else(|| {
            let err = EngineError::UnsupportedPlatform {
                os: host.os.to_string(),
            };
            log_engine_error(&err, "new_player");
            err
        })?;
        info!("[EngineFactory] Host {} -> {} player", host.os, platform);

        MediaPlayer::attach(handle, variant_for(platform), full_screen, &self.events)
    }

    /// Open a reader over the engine's message log.
    pub fn new_log(&self) -> Result<EngineLog, EngineError> {
        EngineLog::open(self.shared_handle("new_log")?)
    }

    // ========================================================================
    // RELEASE
    // ========================================================================

    pub fn is_released(&self) -> bool {
        self.lock_handle().is_none()
    }

    /// Give up the factory's share of the engine instance.
    ///
    /// Returns true for the first call; later calls are no-ops.
    pub fn release(&self) -> bool {
        let Some(handle) = self.lock_handle().take() else {
            return false;
        };
        handle.request_release();

        match Arc::try_unwrap(handle) {
            Ok(handle) => {
                handle.release();
                info!("[EngineFactory] Released");
            }
            Err(shared) => {
                warn!(
                    "[EngineFactory] Released with {} player(s)/log(s) still open, \
                     engine teardown deferred to the last one",
                    Arc::strong_count(&shared) - 1
                );
            }
        }
        true
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<Arc<NativeHandle>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn shared_handle(&self, operation: &'static str) -> Result<Arc<NativeHandle>, EngineError> {
        self.lock_handle().as_ref().map(Arc::clone).ok_or_else(|| {
            let err = EngineError::released("EngineFactory", operation);
            log_engine_error(&err, operation);
            err
        })
    }

    fn with_instance<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&dyn NativeEngine, RawInstance) -> R,
    ) -> Result<R, EngineError> {
        self.shared_handle(operation)?.with_instance(operation, f)
    }
}

impl Drop for EngineFactory {
    fn drop(&mut self) {
        if !self.is_released() {
            warn!("[EngineFactory] Dropped without release, releasing from drop");
            self.release();
        }
    }
}

#[cfg(test)]
mod tests;
