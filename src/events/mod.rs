//! Player events, listener capability set and per-player fan-out.

mod listener;
mod model;
mod registry;

pub use listener::{EventListenerAdapter, MediaPlayerEventListener};
pub use model::{PlayerEvent, PlayerId, VideoMetaData};
pub use registry::EventListenerRegistry;
