//! Media players and their platform variants.
//!
//! The factory picks a [`Platform`] and asks [`variant_for`] for the
//! matching [`PlatformPlayer`]; everything else about a player (control
//! surface, listeners, release ordering) lives in [`MediaPlayer`].

use crate::engine::Platform;
use crate::native::{NativeEngine, RawPlayer, SurfaceBinding};

mod full_screen;
mod mac;
mod media_player;
mod unix;
mod windows;

pub use full_screen::{DefaultFullScreenStrategy, FullScreenStrategy};
pub use mac::MacPlayer;
pub use media_player::{MediaPlayer, PlayerState};
pub use unix::UnixPlayer;
pub use windows::WindowsPlayer;

/// Platform-specific part of a media player.
///
/// Each variant asks the engine for its own surface binding and owns any
/// teardown the platform needs before the native player goes away.
pub trait PlatformPlayer: Send + Sync {
    fn platform(&self) -> Platform;

    fn binding(&self) -> SurfaceBinding {
        self.platform().binding()
    }

    /// Release the native player and anything the platform attached to it.
    fn release_resources(&self, engine: &dyn NativeEngine, player: RawPlayer) {
        engine.release_player(player);
    }
}

type VariantConstructor = fn() -> Box<dyn PlatformPlayer>;

fn new_unix() -> Box<dyn PlatformPlayer> {
    Box::new(UnixPlayer::new())
}

fn new_windows() -> Box<dyn PlatformPlayer> {
    Box::new(WindowsPlayer::new())
}

fn new_mac() -> Box<dyn PlatformPlayer> {
    Box::new(MacPlayer::new())
}

/// Constructor for the variant of `platform`.
pub fn variant_for(platform: Platform) -> Box<dyn PlatformPlayer> {
    let constructor: VariantConstructor = match platform {
        Platform::Unix => new_unix,
        Platform::Windows => new_windows,
        Platform::Mac => new_mac,
    };
    constructor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_matches_platform() {
        for platform in [Platform::Unix, Platform::Windows, Platform::Mac] {
            let variant = variant_for(platform);
            assert_eq!(variant.platform(), platform);
            assert_eq!(variant.binding(), platform.binding());
        }
    }
}
