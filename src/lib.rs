// Media Player Core - native media engine lifecycle
// Single engine instance, per-platform players, ordered listener fan-out

// Module declarations
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod native;
pub mod player;

// Re-exports for convenience
pub use config::{EventsConfig, FactoryConfig, IdentityConfig};
pub use engine::{EngineFactory, EngineLog, HostTraits, LogLevel, NativeHandle, Platform};
pub use error::{EngineError, ErrorCode, ListenerDispatchError};
pub use events::{
    EventListenerAdapter, EventListenerRegistry, MediaPlayerEventListener, PlayerEvent, PlayerId,
    VideoMetaData,
};
pub use native::{NativeEngine, StubEngine};
pub use player::{DefaultFullScreenStrategy, FullScreenStrategy, MediaPlayer, PlayerState};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_root_reexports_cover_basic_flow() {
        let engine = Arc::new(StubEngine::new());
        let factory = EngineFactory::new(engine, &[]).unwrap();
        assert_eq!(factory.log_verbosity().unwrap(), LogLevel::Warning.int_value());
        assert!(factory.release());
    }
}
