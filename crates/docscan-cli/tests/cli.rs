//! End-to-end tests of the `docscan` binary that need no running services.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn docscan() -> Command {
    Command::cargo_bin("docscan").unwrap()
}

#[test]
fn test_help_lists_commands() {
    docscan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    docscan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("docscan"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    let config = config.to_str().unwrap();

    docscan()
        .args(["-c", config, "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    docscan()
        .args(["-c", config, "config", "get", "hallucination.threshold"])
        .assert()
        .success()
        .stdout(predicate::str::diff("2\n"));

    docscan()
        .args(["-c", config, "config", "set", "hallucination.threshold", "3"])
        .assert()
        .success();

    docscan()
        .args(["-c", config, "config", "get", "hallucination.threshold"])
        .assert()
        .success()
        .stdout(predicate::str::diff("3\n"));

    docscan()
        .args(["-c", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.json");

    docscan()
        .args(["-c", config.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_get_unknown_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");

    docscan()
        .args(["-c", config.to_str().unwrap(), "config", "get", "nope.nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_process_requires_existing_file() {
    docscan()
        .args(["process", "/nonexistent/check.jpg", "--type", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejects_unknown_type() {
    docscan()
        .args(["process", "check.jpg", "--type", "invoice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn test_batch_without_matches() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.jpg");

    docscan()
        .args(["batch", pattern.to_str().unwrap(), "--type", "receipt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}
