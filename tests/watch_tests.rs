use onionboot::bootstrap::PanelState;
use onionboot::config::Config;
use onionboot::ui::PlainRenderer;
use onionboot::watch::run_watch;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn config_running(run: &str) -> Config {
    let mut config = Config::default();
    config.service.run = run.to_owned();
    config.service.shutdown_grace_ms = 300;
    config
}

fn watch(name: &str, run: &str, json: bool) -> (onionboot::watch::WatchOutcome, String) {
    let config = config_running(run);
    let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);
    let outcome = run_watch(&config, temp_workspace(name), json, &mut renderer).expect("watch");
    let output = String::from_utf8(renderer.into_inner()).expect("utf8");
    (outcome, output)
}

#[test]
fn watch_reports_progress_until_connected() {
    let (outcome, output) = watch(
        "connected",
        "printf '[notice] Bootstrapped 45%% (requesting_descriptors)\\n'; sleep 0.1; printf '[notice] Bootstrapped 100%% (done): Done\\n'; sleep 30",
        false,
    );

    assert!(outcome.connected(), "output={output}");
    assert!(output.contains("connecting: Starting Tor..."));
    assert!(output.contains("connecting: Bootstrapped 45% (requesting_descriptors)"));
    assert!(output.contains("connected: Bootstrapped 100% (done): Done"));
    assert!(output.contains("[connected] Tor is ready"));
}

#[test]
fn watch_json_emits_one_record_per_change() {
    let (outcome, output) = watch(
        "json",
        "printf 'NOTICE: Bootstrapped 5%% (conn)\\n'; sleep 0.1; printf 'NOTICE: Bootstrapped 100%% (done): Done\\n'; sleep 30",
        true,
    );

    assert!(outcome.connected());
    let records = output
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
        .collect::<Vec<_>>();
    assert_eq!(records.first().expect("first record")["text"], "Starting Tor...");
    let last = records.last().expect("last record");
    assert_eq!(last["state"], "connected");
    assert_eq!(last["error"], false);
    assert!(!output.contains("[connected]"));
}

#[test]
fn service_exit_before_completion_is_a_bootstrap_error() {
    let (outcome, output) = watch(
        "early-exit",
        "printf 'NOTICE: Bootstrapped 10%% (conn_done)\\n'; exit 3",
        false,
    );

    assert_eq!(outcome.state, PanelState::BootstrapError);
    assert_eq!(outcome.service_exit.as_deref(), Some("exit=3"));
    assert!(output.contains("connecting: Bootstrapped 10% (conn_done)"));
    assert!(output.contains("bootstrap-error: Tor failed to start."));
}

#[test]
fn error_line_is_reported_but_a_later_completion_still_connects() {
    let (outcome, output) = watch(
        "err-then-done",
        "printf 'Oct 16 00:00:00.000 [err] guard handshake error\\n'; sleep 0.1; printf '[notice] Bootstrapped 100%% (done): Done\\n'; sleep 30",
        false,
    );

    assert!(outcome.connected(), "output={output}");
    assert!(output.contains("bootstrap-error: Tor failed to start."));
    assert!(output.contains("connected: Bootstrapped 100% (done): Done"));
    assert!(output.contains("[connected] Tor is ready"));
}

#[test]
fn json_records_flag_the_error_before_completion() {
    let (outcome, output) = watch(
        "err-json",
        "printf 'ERROR: transient\\n'; sleep 0.1; printf 'NOTICE: Bootstrapped 100%% (done): Done\\n'; sleep 30",
        true,
    );

    assert!(outcome.connected());
    let records = output
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json line"))
        .collect::<Vec<_>>();
    assert!(records
        .iter()
        .any(|record| record["state"] == "bootstrap-error" && record["error"] == true));
    assert_eq!(records.last().expect("last record")["state"], "connected");
}

fn temp_workspace(name: &str) -> PathBuf {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("onionboot-watch-{name}-{ts}"));
    fs::create_dir_all(&root).expect("mkdir workspace");
    root
}
