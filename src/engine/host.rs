//! Host platform detection and player-variant selection.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::native::SurfaceBinding;

/// Player variant discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Unix,
    Windows,
    Mac,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Unix => "unix",
            Platform::Windows => "windows",
            Platform::Mac => "mac",
        }
    }

    /// Window-system binding the variant asks the engine for.
    pub fn binding(&self) -> SurfaceBinding {
        match self {
            Platform::Unix => SurfaceBinding::Xlib,
            Platform::Windows => SurfaceBinding::Win32,
            Platform::Mac => SurfaceBinding::Cocoa,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability flags describing a host, real or simulated.
///
/// macOS reports both `unix_like` and `mac_like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostTraits {
    pub os: &'static str,
    pub unix_like: bool,
    pub windows_like: bool,
    pub mac_like: bool,
}

static CURRENT_HOST: Lazy<HostTraits> = Lazy::new(HostTraits::detect);

impl HostTraits {
    /// Flags for the host this binary was compiled for.
    pub fn detect() -> Self {
        let os = std::env::consts::OS;
        cfg_if::cfg_if! {
            if #[cfg(target_os = "macos")] {
                HostTraits { os, unix_like: true, windows_like: false, mac_like: true }
            } else if #[cfg(windows)] {
                HostTraits { os, unix_like: false, windows_like: true, mac_like: false }
            } else if #[cfg(unix)] {
                HostTraits { os, unix_like: true, windows_like: false, mac_like: false }
            } else {
                HostTraits { os, unix_like: false, windows_like: false, mac_like: false }
            }
        }
    }

    pub fn current() -> &'static HostTraits {
        &CURRENT_HOST
    }
}

type HostPredicate = fn(&HostTraits) -> bool;

// Generic unix excludes mac so the Mac rule wins on macOS even though the
// unix rule is evaluated first.
fn is_nix(host: &HostTraits) -> bool {
    host.unix_like && !host.mac_like
}

fn is_windows(host: &HostTraits) -> bool {
    host.windows_like
}

fn is_mac(host: &HostTraits) -> bool {
    host.mac_like
}

/// Ordered (predicate, variant) rules, evaluated top to bottom.
pub const PLATFORM_RULES: [(HostPredicate, Platform); 3] = [
    (is_nix, Platform::Unix),
    (is_windows, Platform::Windows),
    (is_mac, Platform::Mac),
];

/// First variant whose predicate accepts `host`.
pub fn select_platform(host: &HostTraits) -> Option<Platform> {
    PLATFORM_RULES
        .iter()
        .find(|(accepts, _)| accepts(host))
        .map(|(_, platform)| *platform)
}
