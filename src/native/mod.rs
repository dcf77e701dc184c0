//! Capability surface of the external native media engine.
//!
//! Everything the core needs from the engine goes through [`NativeEngine`].
//! The engine itself (decode, render, its own threads) is opaque: it hands
//! out raw references and calls back into a [`NativeEventSink`] from
//! threads the caller does not control.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod stub;
pub use stub::{NativeCall, StubEngine};

/// Opaque engine instance returned by [`NativeEngine::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawInstance(pub u64);

/// Opaque native player created on top of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawPlayer(pub u64);

/// Opaque native log reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawLog(pub u64);

/// Window-system binding requested when attaching a native player.
///
/// Each platform variant asks for its own binding; the engine exposes one
/// attach entry point per binding kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceBinding {
    Xlib,
    Win32,
    Cocoa,
}

/// Raw notification raised by the engine for one native player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeEvent {
    Playing,
    Paused,
    Stopped,
    EndReached,
    VideoOutput { width: u32, height: u32 },
    LengthChanged(i64),
    PositionChanged(f32),
    TimeChanged(i64),
    EncounteredError,
}

/// One entry read from a native log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub severity: i32,
    pub module: String,
    pub message: String,
}

/// Callback target for native events.
///
/// Invoked on engine-owned threads. Events for a single player arrive in
/// the order the engine raised them.
pub trait NativeEventSink: Send + Sync {
    fn on_native_event(&self, event: NativeEvent);
}

/// Native media engine entry points.
///
/// Calls against a released instance, player or log are undefined on the
/// native side; the owning wrappers guarantee they never happen.
pub trait NativeEngine: Send + Sync {
    /// Start an engine instance. `None` means the engine refused the
    /// arguments or the native library is unusable.
    fn init(&self, args: &[String]) -> Option<RawInstance>;
    fn release(&self, instance: RawInstance);

    fn set_log_verbosity(&self, instance: RawInstance, level: i32);
    fn log_verbosity(&self, instance: RawInstance) -> i32;
    fn set_user_agent(&self, instance: RawInstance, name: &str, http_name: Option<&str>);

    fn attach_player(&self, instance: RawInstance, binding: SurfaceBinding) -> Option<RawPlayer>;
    fn release_player(&self, player: RawPlayer);
    fn attach_events(&self, player: RawPlayer, sink: Arc<dyn NativeEventSink>);
    fn detach_events(&self, player: RawPlayer);

    fn play_media(&self, player: RawPlayer, mrl: &str) -> bool;
    fn play(&self, player: RawPlayer);
    fn pause(&self, player: RawPlayer);
    fn stop(&self, player: RawPlayer);
    fn set_time(&self, player: RawPlayer, time_ms: i64);
    fn time(&self, player: RawPlayer) -> i64;
    fn length(&self, player: RawPlayer) -> i64;
    fn set_position(&self, player: RawPlayer, position: f32);
    fn position(&self, player: RawPlayer) -> f32;
    fn is_playing(&self, player: RawPlayer) -> bool;

    fn log_open(&self, instance: RawInstance) -> Option<RawLog>;
    fn log_close(&self, log: RawLog);
    fn log_messages(&self, log: RawLog) -> Vec<LogMessage>;
    fn log_count(&self, log: RawLog) -> usize;
    fn log_clear(&self, log: RawLog);
}
