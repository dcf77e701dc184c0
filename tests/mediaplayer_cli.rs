use std::process::Command;

use serde_json::Value;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mediaplayer_cli"))
}

#[cfg(any(unix, windows))]
#[test]
fn probe_reports_variant() {
    let output = cli().arg("probe").output().expect("probe command");

    assert!(output.status.success(), "probe exited with {:?}", output.status.code());
    let report: Value = serde_json::from_slice(&output.stdout).expect("probe JSON");
    assert!(report["variant"].is_string(), "unexpected report {report}");
}

#[cfg(any(unix, windows))]
#[test]
fn demo_prints_events_until_finished() {
    let output = cli()
        .args(["demo", "--length-ms", "400", "--ticks", "2", "--tick-ms", "5"])
        .output()
        .expect("demo command");

    assert!(output.status.success(), "demo exited with {:?}", output.status.code());
    let stdout = String::from_utf8(output.stdout).expect("stdout utf8");
    let events: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("event JSON line"))
        .collect();

    assert_eq!(events.first().unwrap()["event"]["type"], "playing");
    assert_eq!(events.last().unwrap()["event"]["type"], "finished");
}
