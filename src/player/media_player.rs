//! MediaPlayer: one playback session on a shared engine instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::config::EventsConfig;
use crate::engine::{NativeHandle, Platform};
use crate::error::{log_engine_error, EngineError, ListenerDispatchError};
use crate::events::{EventListenerRegistry, MediaPlayerEventListener, PlayerEvent, PlayerId};
use crate::native::{NativeEngine, RawPlayer};

use super::{FullScreenStrategy, PlatformPlayer};

static NEXT_PLAYER_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle of a media player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    /// Native player exists, callbacks not yet attached
    Constructed,
    /// Callbacks attached, control surface usable
    Active,
    /// Terminal
    Released,
}

struct PlayerInner {
    state: PlayerState,
    handle: Option<Arc<NativeHandle>>,
}

/// Media player bound to a platform variant.
///
/// Created by `EngineFactory::new_player`. Holds a share of the engine
/// instance until released; no method other than `release` works after
/// that. Control calls hold a read guard for the duration of the native
/// call, release takes the write guard.
pub struct MediaPlayer {
    id: PlayerId,
    variant: Box<dyn PlatformPlayer>,
    engine: Arc<dyn NativeEngine>,
    raw: RawPlayer,
    registry: Arc<EventListenerRegistry>,
    full_screen: Arc<dyn FullScreenStrategy>,
    inner: RwLock<PlayerInner>,
}

impl MediaPlayer {
    /// Create the native player for `variant` and hook up its callbacks.
    pub(crate) fn attach(
        handle: Arc<NativeHandle>,
        variant: Box<dyn PlatformPlayer>,
        full_screen: Arc<dyn FullScreenStrategy>,
        events: &EventsConfig,
    ) -> Result<Self, EngineError> {
        let platform = variant.platform();
        let binding = variant.binding();
        let raw = handle
            .with_instance("new_player", |engine, instance| {
                engine.attach_player(instance, binding)
            })?
            .ok_or_else(|| {
                let err = EngineError::PlayerAttachFailed {
                    platform: platform.to_string(),
                };
                log_engine_error(&err, "new_player");
                err
            })?;

        let id = PlayerId(NEXT_PLAYER_ID.fetch_add(1, Ordering::SeqCst));
        let player = Self {
            id,
            variant,
            engine: Arc::clone(handle.engine()),
            raw,
            registry: Arc::new(EventListenerRegistry::new(id, events)),
            full_screen,
            inner: RwLock::new(PlayerInner {
                state: PlayerState::Constructed,
                handle: Some(handle),
            }),
        };
        player.activate();
        info!("[MediaPlayer] Created {} ({} variant)", id, platform);
        Ok(player)
    }

    fn activate(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let sink = Arc::clone(&self.registry);
        self.engine.attach_events(self.raw, sink);
        inner.state = PlayerState::Active;
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn platform(&self) -> Platform {
        self.variant.platform()
    }

    pub fn state(&self) -> PlayerState {
        self.read_inner().state
    }

    pub fn is_released(&self) -> bool {
        self.state() == PlayerState::Released
    }

    // ========================================================================
    // CONTROL SURFACE
    // ========================================================================

    /// Open `mrl` and start playing it. Returns false if the engine could
    /// not open the media.
    pub fn play_media(&self, mrl: &str) -> Result<bool, EngineError> {
        debug!("[MediaPlayer] {} play_media(mrl={})", self.id, mrl);
        self.with_active("play_media", |engine, raw| engine.play_media(raw, mrl))
    }

    pub fn play(&self) -> Result<(), EngineError> {
        self.with_active("play", |engine, raw| engine.play(raw))
    }

    pub fn pause(&self) -> Result<(), EngineError> {
        self.with_active("pause", |engine, raw| engine.pause(raw))
    }

    pub fn stop(&self) -> Result<(), EngineError> {
        self.with_active("stop", |engine, raw| engine.stop(raw))
    }

    pub fn set_time(&self, time_ms: i64) -> Result<(), EngineError> {
        self.with_active("set_time", |engine, raw| engine.set_time(raw, time_ms))
    }

    pub fn time(&self) -> Result<i64, EngineError> {
        self.with_active("time", |engine, raw| engine.time(raw))
    }

    pub fn length(&self) -> Result<i64, EngineError> {
        self.with_active("length", |engine, raw| engine.length(raw))
    }

    pub fn set_position(&self, position: f32) -> Result<(), EngineError> {
        self.with_active("set_position", |engine, raw| {
            engine.set_position(raw, position)
        })
    }

    pub fn position(&self) -> Result<f32, EngineError> {
        self.with_active("position", |engine, raw| engine.position(raw))
    }

    pub fn is_playing(&self) -> Result<bool, EngineError> {
        self.with_active("is_playing", |engine, raw| engine.is_playing(raw))
    }

    // ========================================================================
    // FULL SCREEN
    // ========================================================================

    pub fn set_full_screen(&self, full_screen: bool) -> Result<(), EngineError> {
        self.with_active("set_full_screen", |_, _| {
            if full_screen {
                self.full_screen.enter_full_screen_mode();
            } else {
                self.full_screen.exit_full_screen_mode();
            }
        })
    }

    pub fn toggle_full_screen(&self) -> Result<(), EngineError> {
        let current = self.is_full_screen()?;
        self.set_full_screen(!current)
    }

    pub fn is_full_screen(&self) -> Result<bool, EngineError> {
        self.with_active("is_full_screen", |_, _| {
            self.full_screen.is_full_screen_mode()
        })
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    pub fn add_listener(
        &self,
        listener: Arc<dyn MediaPlayerEventListener>,
    ) -> Result<(), EngineError> {
        self.with_active("add_listener", |_, _| self.registry.add(listener))
    }

    /// Remove one registration of `listener`; false if it was not registered.
    pub fn remove_listener(
        &self,
        listener: &Arc<dyn MediaPlayerEventListener>,
    ) -> Result<bool, EngineError> {
        self.with_active("remove_listener", |_, _| self.registry.remove(listener))
    }

    /// Receiver of every event this player dispatches from now on.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<PlayerEvent>, EngineError> {
        self.with_active("subscribe", |_, _| self.registry.subscribe())
    }

    /// Stream form of [`subscribe`](Self::subscribe); lagged items surface
    /// as errors.
    pub fn event_stream(&self) -> Result<BroadcastStream<PlayerEvent>, EngineError> {
        self.subscribe().map(BroadcastStream::new)
    }

    /// Listener failures isolated during dispatch, oldest first.
    pub fn listener_failures(&self) -> Vec<ListenerDispatchError> {
        self.registry.recent_failures()
    }

    // ========================================================================
    // RELEASE
    // ========================================================================

    /// Tear the player down: detach native callbacks, release platform
    /// resources and the native player, clear listeners, then give back
    /// the engine share.
    ///
    /// Returns true for the call that performed the teardown.
    pub fn release(&self) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.state == PlayerState::Released {
            return false;
        }
        let _span = tracing::debug_span!("player_release", player = %self.id).entered();

        if inner.state == PlayerState::Active {
            self.engine.detach_events(self.raw);
        }
        self.registry.deactivate();

        if self.full_screen.is_full_screen_mode() {
            self.full_screen.exit_full_screen_mode();
        }
        self.variant.release_resources(self.engine.as_ref(), self.raw);

        self.registry.clear();
        inner.state = PlayerState::Released;
        let handle = inner.handle.take();
        drop(inner);
        // Last share may perform a deferred engine release.
        drop(handle);

        info!("[MediaPlayer] Released {}", self.id);
        true
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, PlayerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_active<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&dyn NativeEngine, RawPlayer) -> R,
    ) -> Result<R, EngineError> {
        let inner = self.read_inner();
        if inner.state != PlayerState::Active {
            let err = EngineError::released("MediaPlayer", operation);
            log_engine_error(&err, operation);
            return Err(err);
        }
        Ok(f(self.engine.as_ref(), self.raw))
    }
}

impl Drop for MediaPlayer {
    fn drop(&mut self) {
        if !self.is_released() {
            warn!("[MediaPlayer] {} dropped without release, releasing from drop", self.id);
            self.release();
        }
    }
}
