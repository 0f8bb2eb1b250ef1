//! `yta` binary tests for commands that need no running server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `yta` command isolated from the user's config and environment.
fn yta(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("yta").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("YTA_API_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(temp.path().join("config.toml"));
    cmd
}

#[test]
fn test_validate_accepts_valid_template() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .args(["validate", "--name", "Topic", "--content", "Has {{topic}} token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Template is valid"))
        .stdout(predicate::str::contains("{{topic}}"));
}

#[test]
fn test_validate_reports_every_failed_rule() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .args(["validate", "--name", "Empty", "--content", ""])
        .assert()
        .failure()
        .stdout(predicate::str::contains("content: Content must not be empty"))
        .stdout(predicate::str::contains("content: Content must contain at least one placeholder"));
}

#[test]
fn test_validate_rejects_empty_placeholder() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .args(["validate", "--content", "Has {{}} empty token"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("empty placeholder"));
}

#[test]
fn test_validate_json_output() {
    let temp = TempDir::new().unwrap();
    let output = yta(&temp)
        .args(["validate", "--content", "plain text, no tokens", "--format", "json"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["reasons"].as_array().unwrap().len(), 1);
    assert_eq!(json["placeholders"].as_array().unwrap().len(), 0);
}

#[test]
fn test_placeholders_lists_tokens_in_order() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .args(["placeholders", "Top {{n}} {{topic}} for {{topic}} {{ }}"])
        .assert()
        .success()
        .stdout(predicate::str::contains("n\ntopic\n"))
        .stdout(predicate::str::contains("1 empty placeholder(s)"));
}

#[test]
fn test_placeholders_json_output() {
    let temp = TempDir::new().unwrap();
    let output = yta(&temp)
        .args(["placeholders", "{{a}} {placeholder} {{b}} {{incomplete", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["tokens"], serde_json::json!(["a", "b"]));
    assert_eq!(json["empty"], 0);
}

#[test]
fn test_apply_requires_template_selection() {
    let temp = TempDir::new().unwrap();
    yta(&temp).args(["apply", "--project", "1"]).assert().failure();
}

#[test]
fn test_create_validates_before_contacting_api() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .env("YTA_API_URL", "http://127.0.0.1:1")
        .args(["create", "--type", "thumbnail", "--name", "X", "--content", "no tokens"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid template"))
        .stderr(predicate::str::contains("Cannot reach").not());
}

#[test]
fn test_list_reports_unreachable_api() {
    let temp = TempDir::new().unwrap();
    yta(&temp)
        .env("YTA_API_URL", "http://127.0.0.1:1")
        .args(["list", "--type", "title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load templates"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "api_url = [not toml").unwrap();
    yta(&temp)
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
