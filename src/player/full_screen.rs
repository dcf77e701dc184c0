//! Pluggable full-screen behaviour injected at player construction.

use std::sync::atomic::{AtomicBool, Ordering};

/// Platform full-screen capability supplied by the caller.
pub trait FullScreenStrategy: Send + Sync {
    fn enter_full_screen_mode(&self);
    fn exit_full_screen_mode(&self);
    fn is_full_screen_mode(&self) -> bool;
}

/// Headless strategy that only tracks the requested mode.
#[derive(Debug, Default)]
pub struct DefaultFullScreenStrategy {
    full_screen: AtomicBool,
}

impl DefaultFullScreenStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FullScreenStrategy for DefaultFullScreenStrategy {
    fn enter_full_screen_mode(&self) {
        self.full_screen.store(true, Ordering::SeqCst);
    }

    fn exit_full_screen_mode(&self) {
        self.full_screen.store(false, Ordering::SeqCst);
    }

    fn is_full_screen_mode(&self) -> bool {
        self.full_screen.load(Ordering::SeqCst)
    }
}
