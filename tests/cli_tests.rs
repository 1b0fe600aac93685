//! Integration tests for the CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const LLMS_TXT: &str = "# Example Site\n\n> Example is a site about examples, written for humans and agents alike.\n\n## Docs\n\n- [Guide](https://example.com/guide): the guide\n- [API](https://example.com/api): the API\n";

fn ready_site() -> mockito::ServerGuard {
    let mut server = mockito::Server::new();
    server.mock("GET", "/").with_body("<html></html>").create();
    server.mock("GET", "/llms.txt").with_body(LLMS_TXT).create();
    server
        .mock("GET", "/llms-full.txt")
        .with_body(LLMS_TXT)
        .create();
    server
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Audit websites for AI agent readiness"))
        .stdout(predicate::str::contains("--checks"));
}

#[test]
fn test_cli_requires_url() {
    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.assert().code(2);
}

#[test]
fn test_cli_invalid_url() {
    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg("not-a-url");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid URL"));
}

#[test]
fn test_cli_unknown_check() {
    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.args(["https://example.com", "--checks", "llms-txt,bogus"]);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown check(s): bogus"))
        .stderr(predicate::str::contains("robots-txt"));
}

#[test]
fn test_cli_unknown_format() {
    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.args(["https://example.com", "--format", "pdf"]);

    cmd.assert().code(2);
}

#[test]
fn test_cli_html_report() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/").with_body("<html></html>").create();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(server.url())
        .args(["--checks", "llms-txt", "--format", "html"]);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains(format!(
            "<title>AX Audit: {}</title>",
            server.url()
        )))
        .stdout(predicate::str::contains(r#"<div class="finding fail">"#))
        .stdout(predicate::str::contains("/llms.txt not found"));
}

#[test]
fn test_cli_batch_html() {
    let good = ready_site();
    let bad = mockito::Server::new();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(good.url())
        .arg(bad.url())
        .args(["--checks", "llms-txt", "-f", "html"]);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("<h2>Batch Summary</h2>"))
        .stdout(predicate::str::contains(r#"<span class="badge badge-pass">PASS</span>"#))
        .stdout(predicate::str::contains(r#"<span class="badge badge-fail">FAIL</span>"#));
}

#[test]
fn test_cli_checks_list_tolerates_spaces() {
    let server = ready_site();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(server.url()).args(["--checks", " llms-txt , ", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"overall_score\": 100"));
}

#[test]
fn test_cli_json_report_passes() {
    let server = ready_site();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(server.url()).args(["--checks", "llms-txt", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"overall_score\": 100"))
        .stdout(predicate::str::contains("\"id\": \"llms-txt\""))
        .stdout(predicate::str::contains("robots-txt").not());
}

#[test]
fn test_cli_low_score_exits_one() {
    let mut server = mockito::Server::new();
    server.mock("GET", "/").with_body("<html></html>").create();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(server.url())
        .args(["--checks", "llms-txt", "--format", "markdown"]);

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("# AI Readiness Report"))
        .stdout(predicate::str::contains("/llms.txt not found"));
}

#[test]
fn test_cli_batch_json() {
    let good = ready_site();
    let bad = mockito::Server::new();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(good.url())
        .arg(bad.url())
        .args(["--checks", "llms-txt", "--json"]);

    // average of 100 and 0 is below the pass threshold
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("\"total\": 2"))
        .stdout(predicate::str::contains("\"passed\": 1"))
        .stdout(predicate::str::contains("\"average_score\": 50"));
}

#[test]
fn test_cli_config_file_and_output() {
    let server = ready_site();

    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config,
        "checks = [\"llms-txt\"]\n\n[network]\ntimeout_ms = 5000\n\n[scoring]\npass_threshold = 100"
    )
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.json");

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg(server.url())
        .arg("--config")
        .arg(config.path())
        .args(["-f", "json", "-o"])
        .arg(&output);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["overall_score"], 100);
    assert_eq!(value["results"].as_array().unwrap().len(), 1);
}

#[test]
fn test_cli_invalid_config_file() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    writeln!(config, "[scoring]\npass_threshold = 150").unwrap();

    let mut cmd = Command::cargo_bin("ax-audit").unwrap();
    cmd.arg("https://example.com").arg("-c").arg(config.path());

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load config"));
}
