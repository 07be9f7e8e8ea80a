//! Integration tests for the `bridgectl` binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a device; the rest drive a wiremock bridge.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `bridgectl` binary with env isolation.
///
/// Clears all `BRIDGECTL_*` env vars and points the config file at
/// `config`, so tests never touch the user's real configuration.
fn bridgectl_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("bridgectl");
    cmd.env("HOME", "/tmp/bridgectl-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/bridgectl-cli-test-nonexistent")
        .env("BRIDGECTL_CONFIG", config)
        .env_remove("BRIDGECTL_PROFILE")
        .env_remove("BRIDGECTL_DEVICE")
        .env_remove("BRIDGECTL_OUTPUT")
        .env_remove("BRIDGECTL_TIMEOUT");
    cmd
}

/// Command with a config path that does not exist.
fn bare_cmd() -> assert_cmd::Command {
    bridgectl_cmd(Path::new("/tmp/bridgectl-cli-test-nonexistent/config.toml"))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn device_config() -> Value {
    json!({
        "device1Role": 0,
        "device2Role": 2,
        "device3Role": 0,
        "device4Role": 0,
        "baudrate": 115_200,
        "wifiMode": 0,
        "mdnsHostname": "uart-bridge",
        "boardType": "s3zero",
        "version": "2.18.3"
    })
}

async fn mock_device() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_config()))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = bare_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    bare_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("UART bridges")
            .and(predicate::str::contains("settings"))
            .and(predicate::str::contains("roles"))
            .and(predicate::str::contains("firmware")),
    );
}

#[test]
fn test_version_flag() {
    bare_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bridgectl"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    bare_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    bare_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    bare_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bridgectl"));
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = bare_cmd().arg("reboot-everything").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let output = bare_cmd().args(["-o", "xml", "status"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_settings_subcommands_exist() {
    bare_cmd().args(["settings", "--help"]).assert().success().stdout(
        predicate::str::contains("show")
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("validate")),
    );
}

#[test]
fn test_config_subcommands_exist() {
    bare_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("use")),
    );
}

#[test]
fn test_sbus_source_out_of_range() {
    let output = bare_cmd()
        .args(["-d", "127.0.0.1:9", "sbus", "source", "7"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_status_without_device() {
    let output = bare_cmd().arg("status").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No device configured"),
        "Expected missing-device error:\n{text}"
    );
    assert!(text.contains("--device"), "Expected a hint:\n{text}");
}

#[test]
fn test_unknown_profile() {
    let output = bare_cmd()
        .args(["--profile", "garage", "status"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("garage"));
}

#[test]
fn test_config_show_without_file() {
    bare_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_and_use() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");

    bridgectl_cmd(&file)
        .args(["config", "set", "device", "uart-bridge.local"])
        .assert()
        .success();
    bridgectl_cmd(&file)
        .args(["--profile", "bench", "config", "set", "device", "192.168.4.1"])
        .assert()
        .success();
    bridgectl_cmd(&file)
        .args(["config", "use", "bench"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("default_profile = \"bench\""), "{written}");
    assert!(written.contains("uart-bridge.local"), "{written}");

    bridgectl_cmd(&file)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bench").and(predicate::str::contains("default")));

    let output = bridgectl_cmd(&file)
        .args(["config", "use", "attic"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    let output = bridgectl_cmd(&file)
        .args(["config", "set", "site", "home"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!file.exists());
}

// ── Against a device ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = mock_device().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deviceName": "UART Bridge",
            "version": "2.18.3",
            "uptime": 3725,
            "device1Rx": 10,
            "device1Tx": 20
        })))
        .mount(&server)
        .await;

    let output = bare_cmd()
        .args(["-d", &server.uri(), "-o", "json", "status"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["device_name"], "UART Bridge");
    assert_eq!(body["traffic"][0]["rx"], 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_dry_run_shows_auto_corrections() {
    let server = mock_device().await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = bare_cmd()
        .args([
            "-d",
            &server.uri(),
            "-o",
            "json-compact",
            "settings",
            "set",
            "device3Role=5_1",
            "--dry-run",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let changes: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let d1 = changes
        .iter()
        .find(|c| c["field"] == "device1Role")
        .expect("device1Role should be auto-corrected");
    assert_eq!(d1["automatic"], true);
    assert!(
        changes
            .iter()
            .any(|c| c["field"] == "device3Role" && c["automatic"] == false)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_settings_set_blocked_by_validation() {
    let server = mock_device().await;
    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = bare_cmd()
        .args(["-d", &server.uri(), "-y", "settings", "set", "wifiMode=1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Primary SSID required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_factory_reset_requires_yes_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/config/reset"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = bare_cmd()
        .args(["-d", &server.uri(), "factory-reset"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}
