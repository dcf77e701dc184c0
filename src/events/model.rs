//! Player event types delivered to listeners and async subscribers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::native::NativeEvent;

use super::MediaPlayerEventListener;

/// Identifier of a media player, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

/// Video properties reported once the engine has a video output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetaData {
    pub width: u32,
    pub height: u32,
}

/// Event raised by a media player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlayerEvent {
    Playing,
    Paused,
    Stopped,
    Finished,
    MetaDataAvailable(VideoMetaData),
    LengthChanged { length_ms: i64 },
    PositionChanged { position: f32 },
    TimeChanged { time_ms: i64 },
    Error,
}

impl PlayerEvent {
    /// Stable snake_case name, used in logs and dispatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerEvent::Playing => "playing",
            PlayerEvent::Paused => "paused",
            PlayerEvent::Stopped => "stopped",
            PlayerEvent::Finished => "finished",
            PlayerEvent::MetaDataAvailable(_) => "meta_data_available",
            PlayerEvent::LengthChanged { .. } => "length_changed",
            PlayerEvent::PositionChanged { .. } => "position_changed",
            PlayerEvent::TimeChanged { .. } => "time_changed",
            PlayerEvent::Error => "error",
        }
    }

    /// Invoke the listener method matching this event.
    pub fn deliver(&self, listener: &dyn MediaPlayerEventListener, player: PlayerId) {
        match *self {
            PlayerEvent::Playing => listener.playing(player),
            PlayerEvent::Paused => listener.paused(player),
            PlayerEvent::Stopped => listener.stopped(player),
            PlayerEvent::Finished => listener.finished(player),
            PlayerEvent::MetaDataAvailable(meta) => listener.meta_data_available(player, meta),
            PlayerEvent::LengthChanged { length_ms } => listener.length_changed(player, length_ms),
            PlayerEvent::PositionChanged { position } => {
                listener.position_changed(player, position)
            }
            PlayerEvent::TimeChanged { time_ms } => listener.time_changed(player, time_ms),
            PlayerEvent::Error => listener.error(player),
        }
    }
}

impl From<NativeEvent> for PlayerEvent {
    fn from(event: NativeEvent) -> Self {
        match event {
            NativeEvent::Playing => PlayerEvent::Playing,
            NativeEvent::Paused => PlayerEvent::Paused,
            NativeEvent::Stopped => PlayerEvent::Stopped,
            NativeEvent::EndReached => PlayerEvent::Finished,
            NativeEvent::VideoOutput { width, height } => {
                PlayerEvent::MetaDataAvailable(VideoMetaData { width, height })
            }
            NativeEvent::LengthChanged(length_ms) => PlayerEvent::LengthChanged { length_ms },
            NativeEvent::PositionChanged(position) => PlayerEvent::PositionChanged { position },
            NativeEvent::TimeChanged(time_ms) => PlayerEvent::TimeChanged { time_ms },
            NativeEvent::EncounteredError => PlayerEvent::Error,
        }
    }
}
