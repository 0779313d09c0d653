//! Tests for top-level behavior: help, completions and error reporting.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "key");
    assert_stdout_contains(&output, "secret");
    assert_stdout_contains(&output, "--cluster");
}

#[test]
fn test_errors_suggest_help() {
    let t = Test::with_key();

    let output = t.run(&["key", "remove", "missing"]);
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(&output, "run with --help for usage");
}

#[test]
fn test_cluster_from_environment() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);

    let output = t
        .cmd()
        .env("KAGE_CLUSTER", TEST_CONTEXT)
        .args(["secret", "decrypt", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), SINGLE_FIELD_SECRET);
}

#[test]
fn test_no_context_and_no_kubectl() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);

    let output = t
        .cmd()
        .env("PATH", t.bin.path())
        .args(["secret", "decrypt", file.to_str().unwrap()])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "no current kubernetes context");
}

#[test]
fn test_version() {
    Test::new()
        .cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("kage "));
}

#[test]
fn test_unknown_subcommand() {
    Test::new()
        .cmd()
        .args(["key", "rotate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::with_key();

    t.cmd()
        .args(["--verbose", "--cluster", TEST_CONTEXT, "key", "storage-mode"])
        .assert()
        .success()
        .stdout(predicate::str::diff("local\n"))
        .stderr(predicate::str::contains("key storage loaded"));
}

#[test]
fn test_completions() {
    let t = Test::new();

    for shell in ["bash", "zsh", "fish"] {
        let output = t.cmd().args(["completions", shell]).output().unwrap();
        assert_success(&output);
        assert_stdout_contains(&output, "kage");
    }
}

#[test]
fn test_corrupt_config_reads_as_empty() {
    let t = Test::new();
    t.write_config("storageMode: [not, a, mode\n");

    let output = t.run(&["key", "list", "--json"]);
    assert_success(&output);
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["count"], 0);
}
