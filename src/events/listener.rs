//! Listener capability set and the closure-based adapter.

use super::{PlayerId, VideoMetaData};

/// Receiver of media player events.
///
/// Every method defaults to a no-op, so implementors override only the
/// events they care about. Methods run on engine threads, concurrently
/// with the caller's own control flow.
#[allow(unused_variables)]
pub trait MediaPlayerEventListener: Send + Sync {
    fn playing(&self, player: PlayerId) {}

    fn paused(&self, player: PlayerId) {}

    fn stopped(&self, player: PlayerId) {}

    fn finished(&self, player: PlayerId) {}

    fn meta_data_available(&self, player: PlayerId, meta: VideoMetaData) {}

    fn length_changed(&self, player: PlayerId, length_ms: i64) {}

    fn position_changed(&self, player: PlayerId, position: f32) {}

    fn time_changed(&self, player: PlayerId, time_ms: i64) {}

    fn error(&self, player: PlayerId) {}
}

type Callback = Box<dyn Fn(PlayerId) + Send + Sync>;
type ValueCallback<T> = Box<dyn Fn(PlayerId, T) + Send + Sync>;

/// Listener assembled from closures; unset handlers do nothing.
///
/// ```ignore
/// let listener = EventListenerAdapter::new()
///     .on_finished(|player| log::info!("{} finished", player))
///     .on_time_changed(|_, t| println!("t={}ms", t));
/// player.add_listener(Arc::new(listener))?;
/// ```
#[derive(Default)]
pub struct EventListenerAdapter {
    playing: Option<Callback>,
    paused: Option<Callback>,
    stopped: Option<Callback>,
    finished: Option<Callback>,
    meta_data_available: Option<ValueCallback<VideoMetaData>>,
    length_changed: Option<ValueCallback<i64>>,
    position_changed: Option<ValueCallback<f32>>,
    time_changed: Option<ValueCallback<i64>>,
    error: Option<Callback>,
}

impl EventListenerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_playing(mut self, f: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        self.playing = Some(Box::new(f));
        self
    }

    pub fn on_paused(mut self, f: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        self.paused = Some(Box::new(f));
        self
    }

    pub fn on_stopped(mut self, f: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        self.stopped = Some(Box::new(f));
        self
    }

    pub fn on_finished(mut self, f: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        self.finished = Some(Box::new(f));
        self
    }

    pub fn on_meta_data_available(
        mut self,
        f: impl Fn(PlayerId, VideoMetaData) + Send + Sync + 'static,
    ) -> Self {
        self.meta_data_available = Some(Box::new(f));
        self
    }

    pub fn on_length_changed(mut self, f: impl Fn(PlayerId, i64) + Send + Sync + 'static) -> Self {
        self.length_changed = Some(Box::new(f));
        self
    }

    pub fn on_position_changed(
        mut self,
        f: impl Fn(PlayerId, f32) + Send + Sync + 'static,
    ) -> Self {
        self.position_changed = Some(Box::new(f));
        self
    }

    pub fn on_time_changed(mut self, f: impl Fn(PlayerId, i64) + Send + Sync + 'static) -> Self {
        self.time_changed = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(PlayerId) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl MediaPlayerEventListener for EventListenerAdapter {
    fn playing(&self, player: PlayerId) {
        if let Some(f) = &self.playing {
            f(player);
        }
    }

    fn paused(&self, player: PlayerId) {
        if let Some(f) = &self.paused {
            f(player);
        }
    }

    fn stopped(&self, player: PlayerId) {
        if let Some(f) = &self.stopped {
            f(player);
        }
    }

    fn finished(&self, player: PlayerId) {
        if let Some(f) = &self.finished {
            f(player);
        }
    }

    fn meta_data_available(&self, player: PlayerId, meta: VideoMetaData) {
        if let Some(f) = &self.meta_data_available {
            f(player, meta);
        }
    }

    fn length_changed(&self, player: PlayerId, length_ms: i64) {
        if let Some(f) = &self.length_changed {
            f(player, length_ms);
        }
    }

    fn position_changed(&self, player: PlayerId, position: f32) {
        if let Some(f) = &self.position_changed {
            f(player, position);
        }
    }

    fn time_changed(&self, player: PlayerId, time_ms: i64) {
        if let Some(f) = &self.time_changed {
            f(player, time_ms);
        }
    }

    fn error(&self, player: PlayerId) {
        if let Some(f) = &self.error {
            f(player);
        }
    }
}
