// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Binary-level CLI checks

use assert_cmd::Command;
use predicates::prelude::*;

fn workspace_fixture(dir: &std::path::Path) {
    std::fs::write(
        dir.join(".e2eflow.yaml"),
        r#"
name: fixture
projects:
  app:
    targets:
      serve:
        command: echo
        args: ["listening on port 4200"]
"#,
    )
    .unwrap();
}

#[test]
fn help_lists_the_commands() {
    Command::cargo_bin("e2eflow")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn conflicting_options_fail_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    workspace_fixture(dir.path());

    Command::cargo_bin("e2eflow")
        .unwrap()
        .current_dir(dir.path())
        .args([
            "run",
            "--dev-server",
            "app:serve",
            "--base-url",
            "http://myhost:9000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn run_without_workspace_file_suggests_init() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("e2eflow")
        .unwrap()
        .current_dir(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("e2eflow init"));
}

#[test]
fn validate_accepts_the_fixture_workspace() {
    let dir = tempfile::tempdir().unwrap();
    workspace_fixture(dir.path());

    Command::cargo_bin("e2eflow")
        .unwrap()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn init_writes_a_workspace_that_validates() {
    let dir = tempfile::tempdir().unwrap();

    Command::cargo_bin("e2eflow")
        .unwrap()
        .current_dir(dir.path())
        .args(["init", "demo"])
        .assert()
        .success();

    Command::cargo_bin("e2eflow")
        .unwrap()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success();
}
