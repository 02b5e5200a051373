//! Integration tests for the seddy CLI: runs the actual binary and checks
//! its output, the way a user invoking it from a shell would see it.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn seddy_cmd() -> Command {
    Command::cargo_bin("seddy").unwrap()
}

#[test]
fn help_flag_shows_description() {
    seddy_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "DAG workflow decider for Amazon Simple Workflow Service",
        ))
        .stdout(predicate::str::contains("decider"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("execute"));
}

#[test]
fn version_flag_prints_version() {
    seddy_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_subcommand_is_an_error() {
    seddy_cmd().assert().failure();
}

#[test]
fn execute_rejects_invalid_input_json() {
    let dir = TempDir::new().unwrap();
    let spec_path = dir.path().join("spec.yaml");
    fs::write(
        &spec_path,
        r#"
version: "1.0"
workflows:
  - spec_type: dag
    name: demo
    version: "1.0"
    tasks:
      - id: foo
        type: {name: foo-activity, version: "1.0"}
"#,
    )
    .unwrap();

    seddy_cmd()
        .args([
            "execute",
            spec_path.to_str().unwrap(),
            "demo",
            "1.0",
            "--domain",
            "test-domain",
            "--input",
            "not json",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn execute_rejects_unknown_workflow() {
    let dir = TempDir::new().unwrap();
    let spec_path = dir.path().join("spec.yaml");
    fs::write(
        &spec_path,
        r#"
version: "1.0"
workflows:
  - spec_type: dag
    name: demo
    version: "1.0"
    tasks:
      - id: foo
        type: {name: foo-activity, version: "1.0"}
"#,
    )
    .unwrap();

    seddy_cmd()
        .args([
            "execute",
            spec_path.to_str().unwrap(),
            "nonexistent",
            "1.0",
            "--domain",
            "test-domain",
            "--input",
            "{}",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn decider_rejects_missing_spec_file() {
    seddy_cmd()
        .args([
            "decider",
            "/nonexistent/path/spec.yaml",
            "--domain",
            "test-domain",
            "--task-list",
            "default",
        ])
        .assert()
        .failure();
}
