//! Integration tests for the engine lifecycle
//!
//! These tests drive the public API end to end on the bundled engine:
//! - Factory construction, verbosity and identity
//! - Idempotent release of factory, players and log readers
//! - Deferred engine teardown while players are still open
//! - Platform dispatch on simulated hosts

use std::sync::Arc;

use mediaplayer_core::engine::{EngineFactory, HostTraits, LogLevel, Platform};
use mediaplayer_core::error::{EngineError, EngineErrorCodes, ErrorCode};
use mediaplayer_core::native::{NativeCall, StubEngine};
use mediaplayer_core::player::{DefaultFullScreenStrategy, FullScreenStrategy, PlayerState};
use mediaplayer_core::FactoryConfig;

fn strategy() -> Arc<dyn FullScreenStrategy> {
    Arc::new(DefaultFullScreenStrategy::new())
}

fn linux() -> HostTraits {
    HostTraits {
        os: "linux",
        unix_like: true,
        windows_like: false,
        mac_like: false,
    }
}

fn macos() -> HostTraits {
    HostTraits {
        os: "macos",
        unix_like: true,
        windows_like: false,
        mac_like: true,
    }
}

fn releases(engine: &StubEngine) -> usize {
    engine.count_calls(|c| matches!(c, NativeCall::Release(_)))
}

/// Full happy path: factory → player → release player → release factory
#[test]
fn test_factory_player_lifecycle() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &["--no-xlib".to_string()])
        .expect("engine should start");

    let player = factory
        .new_player_for(&linux(), strategy())
        .expect("player should attach");
    assert_eq!(player.state(), PlayerState::Active);

    assert!(player.release());
    assert!(factory.release());

    assert_eq!(releases(&engine), 1, "native release must happen exactly once");
    assert_eq!(engine.live_instances(), 0);
    assert_eq!(engine.live_players(), 0);
}

/// Calling release repeatedly on any object is silently safe
#[test]
fn test_repeated_release_is_safe() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    let player = factory.new_player_for(&linux(), strategy()).unwrap();
    let log = factory.new_log().unwrap();

    for _ in 0..3 {
        player.release();
        log.close();
        factory.release();
    }

    assert_eq!(releases(&engine), 1);
    assert_eq!(
        engine.count_calls(|c| matches!(c, NativeCall::ReleasePlayer(_))),
        1
    );
    assert_eq!(engine.count_calls(|c| matches!(c, NativeCall::LogClose(_))), 1);
}

/// Engine teardown waits for the last player when the factory goes first
#[test]
fn test_factory_release_with_open_players_is_deferred() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    let first = factory.new_player_for(&linux(), strategy()).unwrap();
    let second = factory.new_player_for(&macos(), strategy()).unwrap();

    factory.release();
    assert_eq!(releases(&engine), 0);

    first.release();
    assert_eq!(releases(&engine), 0);
    assert!(second.set_time(0).is_ok(), "second player still usable");

    second.release();
    assert_eq!(releases(&engine), 1);
}

/// Construction failure surfaces the offending arguments and leaves no factory
#[test]
fn test_initialization_failure_is_reported() {
    let engine = Arc::new(StubEngine::new().with_rejected_argument("--vout=bogus"));
    let args = vec!["--quiet".to_string(), "--vout=bogus".to_string()];

    match EngineFactory::new(engine.clone(), &args) {
        Err(err @ EngineError::Initialization { .. }) => {
            assert_eq!(err.code(), EngineErrorCodes::INITIALIZATION);
            let text = err.to_string();
            assert!(text.contains("--vout=bogus"), "message was: {text}");
            assert!(text.contains("engine arguments"), "message was: {text}");
        }
        Err(other) => panic!("Expected Initialization, got {:?}", other),
        Ok(_) => panic!("Expected Initialization, got a factory"),
    }
    assert_eq!(releases(&engine), 0);
}

/// A host reporting both unix and mac traits gets the Mac variant
#[test]
fn test_mac_host_gets_mac_variant() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();

    let player = factory.new_player_for(&macos(), strategy()).unwrap();
    assert_eq!(player.platform(), Platform::Mac);
    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            NativeCall::AttachPlayer {
                binding: mediaplayer_core::native::SurfaceBinding::Cocoa,
                ..
            }
        )),
        1
    );
}

/// Detected host maps to one of the variants on every supported target
#[cfg(any(unix, windows))]
#[test]
fn test_new_player_on_current_host() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();
    let player = factory.new_player(strategy()).unwrap();

    let expected = if cfg!(target_os = "macos") {
        Platform::Mac
    } else if cfg!(windows) {
        Platform::Windows
    } else {
        Platform::Unix
    };
    assert_eq!(player.platform(), expected);
}

/// Control calls after release fail fast
#[test]
fn test_control_after_release_is_illegal_state() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();
    let player = factory.new_player_for(&linux(), strategy()).unwrap();
    player.release();

    let err = player.play().unwrap_err();
    assert_eq!(err.code(), EngineErrorCodes::ILLEGAL_STATE);
    assert!(err.to_string().contains("play()"));
}

/// Verbosity set through the factory is what the engine reports back
#[test]
fn test_log_level_round_trip() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();

    factory.set_log_level(LogLevel::Warning).unwrap();
    assert_eq!(factory.log_verbosity().unwrap(), 3);
    factory.set_log_level(LogLevel::Notice).unwrap();
    assert_eq!(factory.log_verbosity().unwrap(), 2);
}

/// Configuration file drives engine args, verbosity and identity
#[test]
fn test_factory_from_config_file() {
    let dir = std::env::temp_dir().join(format!("mediaplayer_core_cfg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("mediaplayer.json");
    std::fs::write(
        &path,
        r#"{
            "engine_args": ["--no-audio"],
            "log_level": "debug",
            "identity": { "app_name": "Lobby Screen", "http_app_name": "LobbyScreen/3.0" }
        }"#,
    )
    .unwrap();

    let config = FactoryConfig::load_from_file(&path);
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::from_config(engine.clone(), &config).unwrap();

    assert_eq!(factory.log_verbosity().unwrap(), 0);
    let calls = engine.calls();
    assert_eq!(
        calls[0],
        NativeCall::Init {
            args: vec!["--no-audio".to_string()]
        }
    );
    assert!(calls.iter().any(|c| matches!(
        c,
        NativeCall::SetUserAgent { http_name: Some(h), .. } if h == "LobbyScreen/3.0"
    )));

    std::fs::remove_dir_all(&dir).ok();
}
