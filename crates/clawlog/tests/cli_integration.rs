//! CLI integration tests for the claw-log command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - `auth` subcommands that work offline against a temp data directory
//!
//! Note: No test here performs a browser login or contacts the provider.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the claw-log binary with an isolated data directory.
fn claw_log(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("claw-log").unwrap();
    cmd.env("CLAW_LOG_HOME", home);
    cmd
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Write a token file that will not need refreshing.
fn write_fresh_token(home: &Path) {
    let record = serde_json::json!({
        "access_token": "stored-access-token",
        "refresh_token": "stored-refresh-token",
        "id_token": "eyJhbGciOiJub25lIn0.eyJlbWFpbCI6ImRldkBleGFtcGxlLmNvbSJ9.sig",
        "expires_in": 3600,
        "expires_at": now() + 3600,
        "saved_at": now(),
        "scope": "openid profile email offline_access"
    });
    std::fs::write(
        home.join("oauth_tokens.json"),
        serde_json::to_string_pretty(&record).unwrap(),
    )
    .unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Claw-Log"))
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_version_displays() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("claw-log"));
}

#[test]
fn test_auth_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("token"));
}

#[test]
fn test_unknown_subcommand_rejected() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .args(["auth", "frobnicate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Status Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_not_authenticated() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not authenticated"));
}

#[test]
fn test_status_authenticated() {
    let home = TempDir::new().unwrap();
    write_fresh_token(home.path());

    claw_log(home.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OAuth: authenticated"))
        .stdout(predicate::str::contains("dev@example.com"))
        .stdout(predicate::str::contains("stored-access-token").not());
}

#[test]
fn test_status_json() {
    let home = TempDir::new().unwrap();
    write_fresh_token(home.path());

    let output = claw_log(home.path())
        .args(["--json", "auth", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["authenticated"], true);
    assert_eq!(value["token"]["is_expired"], false);
    assert_eq!(value["token"]["email"], "dev@example.com");
}

#[test]
fn test_status_corrupt_token_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("oauth_tokens.json"), "{ not json").unwrap();

    claw_log(home.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("could not be read"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Token / Login / Logout Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_token_prints_fresh_access_token() {
    let home = TempDir::new().unwrap();
    write_fresh_token(home.path());

    claw_log(home.path())
        .args(["auth", "token"])
        .assert()
        .success()
        .stdout(predicate::str::diff("stored-access-token\n"));
}

#[test]
fn test_token_without_login_fails() {
    let home = TempDir::new().unwrap();
    claw_log(home.path())
        .args(["auth", "token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No OAuth tokens found"));
}

#[test]
fn test_login_skips_when_already_authenticated() {
    let home = TempDir::new().unwrap();
    write_fresh_token(home.path());

    claw_log(home.path())
        .args(["auth", "login"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already authenticated"));
}

#[test]
fn test_logout_removes_tokens() {
    let home = TempDir::new().unwrap();
    write_fresh_token(home.path());

    claw_log(home.path())
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OAuth tokens removed"));
    assert!(!home.path().join("oauth_tokens.json").exists());

    claw_log(home.path())
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No OAuth tokens found"));
}

#[test]
fn test_unwritable_log_dir_falls_back_to_console() {
    let home = TempDir::new().unwrap();
    // A regular file where the log directory should be.
    std::fs::write(home.path().join("logs"), "").unwrap();

    claw_log(home.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not authenticated"))
        .stderr(predicate::str::contains("File logging disabled"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), "[http]\ntimeout_secs = \"x\"").unwrap();

    claw_log(home.path())
        .args(["auth", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}
