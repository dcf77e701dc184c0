//! Windows (Win32) player variant.

use crate::engine::Platform;

use super::PlatformPlayer;

/// Player rendering through a Win32 window handle.
#[derive(Debug, Default)]
pub struct WindowsPlayer {
    _unit: (),
}

impl WindowsPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlatformPlayer for WindowsPlayer {
    fn platform(&self) -> Platform {
        Platform::Windows
    }
}
