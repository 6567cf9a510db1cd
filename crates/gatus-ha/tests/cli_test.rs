//! Integration tests for the `gatus-ha` binary.
//!
//! Argument parsing, help output and completions run without a server;
//! the remaining tests point a temporary config at a wiremock Gatus.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build an `assert_cmd::Command` for the binary with env isolation.
///
/// Clears all `GATUS_*` variables and points config directories at a
/// nonexistent path so tests never touch a real configuration.
fn gatus_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gatus-ha");
    cmd.env("HOME", "/tmp/gatus-ha-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gatus-ha-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("GATUS_CONFIG")
        .env_remove("GATUS_ENTRY")
        .env_remove("GATUS_OUTPUT")
        .env_remove("GATUS_TIMEOUT")
        .env_remove("GATUS_DEFAULT_ENTRY")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(dir: &Path, url: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        format!(
            "default_entry = \"home\"\n\n[entries.home]\nname = \"Home\"\nurl = \"{url}\"\nverify_ssl = false\n"
        ),
    )
    .unwrap();
    path
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || gatus_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

fn args(config: &Path, rest: &[&str]) -> Vec<String> {
    let mut v = vec!["--config".to_string(), config.display().to_string()];
    v.extend(rest.iter().map(ToString::to_string));
    v
}

async fn gatus_with_two_endpoints() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/endpoints/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "web",
                "group": "core",
                "key": "core_web",
                "results": [{"hostname": "web.lan", "duration": 1_000_000, "success": true,
                             "timestamp": "2025-02-04T04:14:22Z"}]
            },
            {
                "name": "atuin",
                "key": "atuin",
                "results": [{"hostname": "atuin.lan", "duration": 84_588_472, "success": false,
                             "errors": ["dial tcp: connection refused"],
                             "timestamp": "2025-02-04T04:14:33Z"}]
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"oidc": false, "authenticated": true})))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gatus_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    gatus_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Gatus")
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("add")),
    );
}

#[test]
fn test_version_flag() {
    gatus_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gatus-ha"));
}

#[test]
fn test_completions_zsh() {
    gatus_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    gatus_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = gatus_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = gatus_cmd()
        .args(["--output", "invalid", "entries"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_status_without_config() {
    gatus_cmd()
        .arg("status")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No Gatus entries"));
}

#[test]
fn test_entries_without_config_is_empty() {
    gatus_cmd()
        .args(["--output", "json", "entries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_remove_unknown_entry() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9");
    gatus_cmd()
        .args(args(&config, &["remove", "nope"]))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope"));
}

// ── Against a mock server ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = gatus_with_two_endpoints().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(&config, &["--output", "json", "status"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let sensors: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let sensors = sensors.as_array().unwrap();
    assert_eq!(sensors.len(), 2);
    // Server order, not alphabetical.
    assert_eq!(sensors[0]["entity_id"], "binary_sensor.gatus_core_web");
    assert_eq!(sensors[0]["state"], "on");
    assert_eq!(sensors[1]["entity_id"], "binary_sensor.gatus_atuin");
    assert_eq!(sensors[1]["state"], "off");
    assert_eq!(sensors[1]["unique_id"], "home_atuin");
    assert_eq!(sensors[1]["attributes"]["group"], "");
    assert_eq!(
        sensors[1]["attributes"]["url"],
        format!("{}/endpoints/atuin", server.uri())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_down_only_plain() {
    let server = gatus_with_two_endpoints().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(&config, &["--output", "plain", "status", "--down"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "binary_sensor.gatus_atuin"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/endpoints/statuses"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(&config, &["status"])).await;
    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_timeout_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/config"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(&config, &["--timeout", "1", "check"])).await;
    assert_eq!(output.status.code(), Some(8), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_connection_refused_exit_code() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &format!("http://{addr}"));

    let output = run(args(&config, &["check"])).await;
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_reports_server_config() {
    let server = gatus_with_two_endpoints().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(&config, &["--output", "json", "check"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["authenticated"], true);
    assert_eq!(view["oidc"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_then_duplicate() {
    let server = gatus_with_two_endpoints().await;
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = run(args(&config, &["add", "Lab Gatus", &server.uri()])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let saved = std::fs::read_to_string(&config).unwrap();
    assert!(saved.contains("[entries.lab_gatus]"), "{saved}");
    assert!(saved.contains("default_entry = \"lab_gatus\""), "{saved}");

    let output = run(args(&config, &["add", "lab gatus", &server.uri()])).await;
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("already configured"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_invalid_url_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = run(args(&config, &["add", "Lab", "not-a-url"])).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    assert!(!config.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = gatus_with_two_endpoints().await;
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), &server.uri());

    let output = run(args(
        &config,
        &["--output", "plain", "watch", "--interval", "1", "--count", "1"],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let web = stdout.find("binary_sensor.gatus_core_web on");
    let atuin = stdout.find("binary_sensor.gatus_atuin off");
    assert!(web.is_some() && atuin.is_some(), "{stdout}");
    assert!(web < atuin, "expected server order:\n{stdout}");
}
