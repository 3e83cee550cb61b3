//! CLI output integration tests.

mod support;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use support::config::{write_temp_config, MINIMAL};

fn poolwarden() -> Command {
    cargo_bin_cmd!("poolwarden")
}

#[test]
fn test_help() {
    poolwarden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("poolwarden"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("reap"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version() {
    poolwarden()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("poolwarden"));
}

#[test]
fn check_config_summarizes_valid_file() {
    let file = write_temp_config(MINIMAL);

    poolwarden()
        .args(["check", "config", "-c"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("app-*"))
        .stdout(predicate::str::contains("240s"));
}

#[test]
fn check_config_fails_on_invalid_file() {
    let file = write_temp_config("[database]\nmax_size = 0\n");

    poolwarden()
        .args(["check", "config", "-c"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_size"));
}

#[test]
fn check_config_fails_on_missing_file() {
    poolwarden()
        .args(["check", "config", "-c", "/nonexistent/poolwarden.toml"])
        .assert()
        .failure();
}
