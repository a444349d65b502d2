use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_help_exits_zero() {
    Command::cargo_bin("drover")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("drover"));
}

#[test]
fn test_run_smoke_script() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["run", fixture_path("smoke.dro").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("DROVER! 7"));
}

#[test]
fn test_run_reads_stdin() {
    Command::cargo_bin("drover")
        .unwrap()
        .arg("run")
        .write_stdin("x = 20 + 1\ny = x * 2")
        .assert()
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn test_run_quiet_suppresses_final_value() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["run", "--quiet"])
        .write_stdin("x = 5")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_run_missing_file_exits_four() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["run", "no_such_script.dro"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("could not read the script"));
}

#[test]
fn test_run_budget_flag_caps_execution() {
    Command::cargo_bin("drover")
        .unwrap()
        .args([
            "run",
            "--budget",
            "30",
            fixture_path("loop.dro").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("budget exceeded"));
}

#[test]
fn test_run_budget_env_var() {
    Command::cargo_bin("drover")
        .unwrap()
        .env("DROVER_BUDGET", "30")
        .args(["run", fixture_path("loop.dro").to_str().unwrap()])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("budget exceeded"));
}

#[test]
fn test_run_failed_assertion_exits_one() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["run", fixture_path("assert_fail.dro").to_str().unwrap()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("device was not ready"));
}

#[test]
fn test_check_reports_skipped_tokens() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["check", fixture_path("broken.dro").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped line 2, column 1: ')'"))
        .stdout(predicate::str::contains(
            "3 statement(s) parsed, 3 token(s) skipped",
        ));
}

#[test]
fn test_check_strict_fails_on_skips() {
    Command::cargo_bin("drover")
        .unwrap()
        .args([
            "check",
            "--strict",
            fixture_path("broken.dro").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("check failed"));
}

#[test]
fn test_check_clean_script() {
    Command::cargo_bin("drover")
        .unwrap()
        .args(["check", fixture_path("smoke.dro").to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "4 statement(s) parsed, 0 token(s) skipped",
        ));
}

#[test]
fn test_ast_emits_parseable_json() {
    let assert = Command::cargo_bin("drover")
        .unwrap()
        .arg("ast")
        .write_stdin("x = 1 + 2")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(json[0]["type"], "assignment");
    assert_eq!(json[0]["variable"], "x");
    assert_eq!(json[0]["value"]["type"], "BINARY_OPERATION");
    assert_eq!(json[0]["value"]["operator"], "+");
}

#[test]
fn test_unknown_subcommand() {
    Command::cargo_bin("drover")
        .unwrap()
        .arg("totally-fake-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
