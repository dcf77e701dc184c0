//! Unix (X11) player variant.

use crate::engine::Platform;

use super::PlatformPlayer;

/// Player rendering through an Xlib surface.
#[derive(Debug, Default)]
pub struct UnixPlayer {
    _unit: (),
}

impl UnixPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformPlayer for UnixPlayer {
    fn platform(&self) -> Platform {
        Platform::Unix
    }
}
