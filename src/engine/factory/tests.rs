use super::*;
use crate::config::IdentityConfig;
use crate::engine::Platform;
use crate::error::{EngineErrorCodes, ErrorCode};
use crate::native::{NativeCall, StubEngine};
use crate::player::DefaultFullScreenStrategy;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn strategy() -> Arc<dyn FullScreenStrategy> {
    Arc::new(DefaultFullScreenStrategy::new())
}

fn host(unix_like: bool, windows_like: bool, mac_like: bool) -> HostTraits {
    HostTraits {
        os: "simulated",
        unix_like,
        windows_like,
        mac_like,
    }
}

fn release_count(engine: &StubEngine) -> usize {
    engine.count_calls(|c| matches!(c, NativeCall::Release(_)))
}

#[test]
fn test_construction_applies_default_verbosity() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &args(&["--quiet"])).unwrap();

    assert_eq!(factory.log_verbosity().unwrap(), 3);
    let calls = engine.calls();
    assert!(matches!(calls[0], NativeCall::Init { .. }));
    assert!(matches!(
        calls[1],
        NativeCall::SetLogVerbosity { level: 3, .. }
    ));
}

#[test]
fn test_failed_init_reports_arguments() {
    let engine = Arc::new(StubEngine::new().with_rejected_argument("--no-such-option"));
    let err = EngineFactory::new(engine.clone(), &args(&["--no-such-option"]))
        .err()
        .unwrap();

    assert_eq!(err.code(), EngineErrorCodes::INITIALIZATION);
    assert!(err.message().contains("--no-such-option"));
    assert_eq!(engine.live_instances(), 0);
}

#[test]
fn test_set_log_level_round_trips() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();

    factory.set_log_level(LogLevel::Debug).unwrap();
    assert_eq!(factory.log_verbosity().unwrap(), 0);
    factory.set_log_level(LogLevel::Warning).unwrap();
    assert_eq!(factory.log_verbosity().unwrap(), 3);
}

#[test]
fn test_set_identity_forwards_missing_http_name() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();

    factory.set_identity("Demo", None).unwrap();
    factory.set_identity("Demo", Some("Demo/1.0")).unwrap();

    let agents: Vec<Option<String>> = engine
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            NativeCall::SetUserAgent { http_name, .. } => Some(http_name),
            _ => None,
        })
        .collect();
    assert_eq!(agents, vec![None, Some("Demo/1.0".to_string())]);
}

#[test]
fn test_from_config_applies_level_and_identity() {
    let engine = Arc::new(StubEngine::new());
    let config = FactoryConfig {
        engine_args: args(&["--no-video-title-show"]),
        log_level: LogLevel::Error,
        identity: Some(IdentityConfig {
            app_name: "Kiosk".to_string(),
            http_app_name: Some("Kiosk/2.1".to_string()),
        }),
        events: EventsConfig::default(),
    };

    let factory = EngineFactory::from_config(engine.clone(), &config).unwrap();

    assert_eq!(factory.log_verbosity().unwrap(), 4);
    assert_eq!(
        engine.count_calls(|c| matches!(
            c,
            NativeCall::SetUserAgent { name, .. } if name == "Kiosk"
        )),
        1
    );
}

#[test]
fn test_variant_follows_host() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();

    let cases = [
        (host(true, false, false), Platform::Unix),
        (host(false, true, false), Platform::Windows),
        (host(true, false, true), Platform::Mac),
    ];
    for (traits, expected) in cases {
        let player = factory.new_player_for(&traits, strategy()).unwrap();
        assert_eq!(player.platform(), expected);
        player.release();
    }
}

#[test]
fn test_unsupported_host_is_rejected() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();

    let err = factory
        .new_player_for(&host(false, false, false), strategy())
        .err()
        .unwrap();
    assert_eq!(
        err,
        EngineError::UnsupportedPlatform {
            os: "simulated".to_string()
        }
    );
    assert_eq!(engine.live_players(), 0);
}

#[test]
fn test_attach_failure_surfaces() {
    let engine = Arc::new(StubEngine::new().refusing_players());
    let factory = EngineFactory::new(engine, &[]).unwrap();

    let err = factory
        .new_player_for(&host(false, true, false), strategy())
        .err()
        .unwrap();
    assert_eq!(err.code(), EngineErrorCodes::PLAYER_ATTACH_FAILED);
}

#[test]
fn test_release_is_idempotent() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();

    assert!(factory.release());
    assert!(!factory.release());
    assert!(factory.is_released());
    assert_eq!(release_count(&engine), 1);
    assert_eq!(engine.live_instances(), 0);
}

#[test]
fn test_operations_after_release_fail() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    factory.release();
    let calls_before = engine.calls().len();

    assert!(factory.set_log_level(LogLevel::Info).unwrap_err().is_illegal_state());
    assert!(factory.log_verbosity().unwrap_err().is_illegal_state());
    assert!(factory.new_log().err().unwrap().is_illegal_state());
    assert!(factory
        .new_player_for(&host(true, false, false), strategy())
        .err()
        .unwrap()
        .is_illegal_state());
    assert_eq!(engine.calls().len(), calls_before);
}

#[test]
fn test_release_waits_for_open_player() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    let player = factory
        .new_player_for(&host(true, false, false), strategy())
        .unwrap();

    assert!(factory.release());
    assert_eq!(release_count(&engine), 0);
    assert!(player.length().is_ok());

    assert!(player.release());
    assert_eq!(release_count(&engine), 1);
    assert_eq!(engine.live_instances(), 0);
}

#[test]
fn test_release_waits_for_open_log() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    let log = factory.new_log().unwrap();

    factory.release();
    assert_eq!(release_count(&engine), 0);

    assert!(log.close());
    assert!(!log.close());
    assert_eq!(release_count(&engine), 1);
    assert!(log.count().unwrap_err().is_illegal_state());
}

#[test]
fn test_log_reader_sees_messages_at_or_above_verbosity() {
    let engine = Arc::new(StubEngine::new());
    let factory = EngineFactory::new(engine, &[]).unwrap();
    let log = factory.new_log().unwrap();

    // Info-level engine message, filtered at the default Warning level.
    factory.set_identity("quiet", None).unwrap();
    assert_eq!(log.count().unwrap(), 0);

    factory.set_log_level(LogLevel::Debug).unwrap();
    factory.set_identity("chatty", None).unwrap();
    assert_eq!(log.count().unwrap(), 1);
    assert!(log.messages().unwrap()[0].message.contains("chatty"));

    log.clear().unwrap();
    assert_eq!(log.count().unwrap(), 0);
}

#[test]
fn test_refused_log_surfaces() {
    let engine = Arc::new(StubEngine::new().refusing_logs());
    let factory = EngineFactory::new(engine, &[]).unwrap();
    assert_eq!(factory.new_log().err().unwrap(), EngineError::LogOpenFailed);
}

#[test]
fn test_drop_releases_engine() {
    let engine = Arc::new(StubEngine::new());
    {
        let _factory = EngineFactory::new(engine.clone(), &[]).unwrap();
    }
    assert_eq!(release_count(&engine), 1);
}
