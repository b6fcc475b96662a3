//! Integration tests for the `billdesk` CLI binary.
//!
//! Argument parsing, help output, config handling and error exit codes,
//! plus a few end-to-end runs against a wiremock billing backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `billdesk` binary with env isolation.
///
/// Clears all `BILLDESK_*` env vars and points the config file at
/// `config` so tests never touch the user's real configuration.
fn billdesk_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("billdesk");
    cmd.env("BILLDESK_CONFIG", config)
        .env("HOME", "/tmp/billdesk-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/billdesk-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("BILLDESK_PROFILE")
        .env_remove("BILLDESK_SERVER")
        .env_remove("BILLDESK_OUTPUT")
        .env_remove("BILLDESK_INSECURE")
        .env_remove("BILLDESK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let dir = tempfile::tempdir().unwrap();
    let cmd = billdesk_cmd(&dir.path().join("config.toml"));
    (dir, cmd)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn api_path(suffix: &str) -> String {
    format!("/api/v1/{suffix}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("billing backend")
            .and(predicate::str::contains("users"))
            .and(predicate::str::contains("tx"))
            .and(predicate::str::contains("call"))
            .and(predicate::str::contains("dashboard")),
    );
}

#[test]
fn test_version_flag() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("billdesk"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_users_list_without_backend_config() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.args(["users", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config init"),
        "Expected a hint to run config init:\n{text}"
    );
}

#[test]
fn test_unknown_profile_exit_code() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--profile", "nope", "users", "list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_page_size_must_be_offered_size() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--server", "http://127.0.0.1:9", "users", "list", "--page-size", "7"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("5, 10, or 25"));
}

#[test]
fn test_negative_price_rejected_before_sending() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--server", "http://127.0.0.1:9", "packages", "set", "sms", "-5"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("price"));
}

#[test]
fn test_bad_msisdn_rejected() {
    let (_dir, mut cmd) = isolated();
    cmd.args([
        "--server",
        "http://127.0.0.1:9",
        "tx",
        "sms",
        "--from",
        "abc",
        "--to",
        "0700000002",
        "--content",
        "hi",
    ])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("from"));
}

#[test]
fn test_connection_refused_exit_code() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["--server", "http://127.0.0.1:1", "--timeout", "5", "users", "list"])
        .assert()
        .code(7);
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_set_then_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    billdesk_cmd(&config)
        .args(["config", "set", "server", "http://localhost:9000"])
        .assert()
        .success();
    assert!(config.exists());

    billdesk_cmd(&config)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    billdesk_cmd(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:9000"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_use_missing_profile() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["config", "use", "lab"]).assert().code(4);
}

// ── Against a mock backend ──────────────────────────────────────────

async fn mock_users(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path("traditional-users/allUsers")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "data": [
            { "msisdn": "0700000001", "name": "Ada", "balance": 12000.0, "isActive": true },
            { "msisdn": "0700000002", "name": "Bo", "balance": 40.0, "isActive": true },
            { "msisdn": "0700000003", "name": "Cy", "balance": 0.0, "isActive": false }
        ] }])))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_users_list_plain() {
    let server = MockServer::start().await;
    mock_users(&server).await;

    let (_dir, mut cmd) = isolated();
    cmd.args(["--server", &server.uri(), "-o", "plain", "users", "list"])
        .assert()
        .success()
        .stdout("0700000001\n0700000002\n0700000003\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_json() {
    let server = MockServer::start().await;
    mock_users(&server).await;

    let (_dir, mut cmd) = isolated();
    let output = cmd
        .args(["--server", &server.uri(), "-o", "json", "dashboard"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["top_by_balance"][0]["msisdn"], "0700000001");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_subscriber_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("traditional-users/userDetails")))
        .and(query_param("MSISDN", "0799999999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (_dir, mut cmd) = isolated();
    cmd.args(["--server", &server.uri(), "users", "get", "0799999999"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("0799999999"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_call_with_empty_balance_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("traditional-users/userDetails")))
        .and(query_param("MSISDN", "0700000003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "msisdn": "0700000003", "name": "Cy", "balance": 0.0 }
        })))
        .mount(&server)
        .await;

    let (_dir, mut cmd) = isolated();
    cmd.args([
        "--server",
        &server.uri(),
        "call",
        "0700000003",
        "0700000001",
        "--max-secs",
        "1",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("balance"));
}
