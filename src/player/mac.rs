//! macOS (Cocoa) player variant.

use log::debug;

use crate::engine::Platform;
use crate::native::{NativeEngine, RawPlayer};

use super::PlatformPlayer;

/// Player rendering through a Cocoa view.
///
/// The Cocoa video output must be stopped before the native player is
/// released, otherwise the engine blocks on the view during teardown.
#[derive(Debug, Default)]
pub struct MacPlayer {
    _unit: (),
}

impl MacPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformPlayer for MacPlayer {
    fn platform(&self) -> Platform {
        Platform::Mac
    }

    fn release_resources(&self, engine: &dyn NativeEngine, player: RawPlayer) {
        if engine.is_playing(player) {
            debug!("[MacPlayer] Stopping {:?} before release", player);
            engine.stop(player);
        }
        engine.release_player(player);
    }
}
