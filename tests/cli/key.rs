//! Tests for `kage key add/list/remove/storage-mode` commands.

use crate::support::*;

#[test]
fn test_storage_mode_defaults_to_local() {
    let t = Test::new();

    let output = t.storage_mode(None);
    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "local");
}

#[test]
fn test_storage_mode_switch_is_persisted() {
    let t = Test::with_key();

    let output = t.storage_mode(Some("cluster"));
    assert_success(&output);
    assert_stderr_contains(&output, "key storage mode set to cluster");
    assert!(t.read_config().contains("storageMode: cluster"));

    // Contexts survive the switch
    assert!(t.read_config().contains(TEST_KEY));

    let output = t.storage_mode(None);
    assert_eq!(stdout(&output).trim(), "cluster");
}

#[test]
fn test_storage_mode_same_mode_writes_nothing() {
    let t = Test::new();

    let output = t.storage_mode(Some("local"));
    assert_success(&output);
    assert_stderr_contains(&output, "already local");
    assert!(!t.config_path().exists());
}

#[test]
fn test_storage_mode_legacy_flag_name() {
    let t = Test::new();

    let output = t.run(&["key", "storage-mode", "--set-storage-mode", "cluster"]);
    assert_success(&output);
    assert!(t.read_config().contains("storageMode: cluster"));
}

#[test]
fn test_storage_mode_rejects_unknown_mode() {
    let t = Test::new();

    let output = t.storage_mode(Some("remote"));
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid storage mode: remote");
}

#[test]
fn test_key_list_json() {
    let t = Test::with_key();

    let parsed = t.key_list_json();
    assert_eq!(parsed["storage_mode"], "local");
    assert_eq!(parsed["count"], 1);

    let ctx = &parsed["contexts"][0];
    assert_eq!(ctx["name"], TEST_CONTEXT);
    assert_eq!(ctx["source"], "local");
    assert_eq!(ctx["public_key"], TEST_PUBLIC_KEY);
    assert!(ctx.get("private_key").is_none());
}

#[test]
fn test_key_list_hides_private_key_by_default() {
    let t = Test::with_key();

    let output = t.run(&["key", "list"]);
    assert_success(&output);
    assert_stdout_contains(&output, TEST_CONTEXT);
    assert_stdout_contains(&output, TEST_PUBLIC_KEY);
    assert_stdout_excludes(&output, TEST_KEY);
}

#[test]
fn test_key_list_show_sensitive() {
    let t = Test::with_key();

    let output = t.run(&["key", "list", "--show-sensitive"]);
    assert_success(&output);
    assert_stdout_contains(&output, TEST_KEY);
}

#[test]
fn test_key_list_marks_unusable_keys() {
    let t = Test::new();
    t.write_config(&local_config("broken", "AGE-SECRET-KEY-1NOTAKEY"));

    let output = t.run(&["key", "list", "--show-sensitive"]);
    assert_success(&output);
    assert_stdout_contains(&output, "broken");
    assert_stdout_contains(&output, "<not set>");
}

#[test]
fn test_key_list_empty() {
    let t = Test::new();

    let output = t.run(&["key", "list"]);
    assert_success(&output);
    assert_stderr_contains(&output, "no contexts stored");
}

#[test]
fn test_key_remove() {
    let t = Test::with_key();

    let output = t.run(&["key", "remove", TEST_CONTEXT]);
    assert_success(&output);
    assert!(!t.read_config().contains(TEST_KEY));

    let parsed = t.key_list_json();
    assert_eq!(parsed["count"], 0);
}

#[test]
fn test_key_remove_nonexistent_context() {
    let t = Test::with_key();
    let before = t.read_config();

    let output = t.run(&["key", "remove", "missing"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "context missing does not exist");
    assert_eq!(t.read_config(), before);
}

#[test]
fn test_key_remove_requires_names_or_all() {
    let t = Test::with_key();

    let output = t.run(&["key", "remove"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no contexts given");
}

#[test]
fn test_key_remove_all() {
    let t = Test::new();
    t.write_config(&format!(
        "storageMode: local\ncontexts:\n  a:\n    privateKey: {TEST_KEY}\n  b:\n    privateKey: {TEST_KEY}\n"
    ));

    let output = t.run(&["key", "remove", "--all", "--yes"]);
    assert_success(&output);
    assert_stderr_contains(&output, "removed 2 contexts");
    assert_eq!(t.key_list_json()["count"], 0);
}

#[cfg(unix)]
#[test]
fn test_key_add_local_mode_stores_key() {
    let t = Test::new();
    t.fake_kubectl();

    let output = t.run(&["key", "add"]);
    assert_success(&output);
    assert_stdout_contains(&output, TEST_PUBLIC_KEY);

    let config = t.read_config();
    assert!(config.contains(TEST_KEY));
    assert!(!config.contains("# created"));
}

#[cfg(unix)]
#[test]
fn test_key_add_uses_current_context() {
    let t = Test::new();
    t.fake_kubectl();

    let output = t.cmd().args(["key", "add"]).output().unwrap();
    assert_success(&output);

    let parsed = t.key_list_json();
    assert_eq!(parsed["contexts"][0]["name"], TEST_CONTEXT);
}

#[cfg(unix)]
#[test]
fn test_key_add_cluster_mode_stores_reference() {
    let t = Test::new();
    t.fake_kubectl();
    assert_success(&t.storage_mode(Some("cluster")));

    let output = t.run(&["key", "add", "-n", "kube-system", "-s", "age-key"]);
    assert_success(&output);

    let config = t.read_config();
    assert!(config.contains("namespace: kube-system"));
    assert!(config.contains("secretName: age-key"));
    assert!(config.contains("keyName: age.agekey"));
    assert!(!config.contains("privateKey"));

    // The key is fetched again on use
    let parsed = t.key_list_json();
    assert_eq!(parsed["contexts"][0]["public_key"], TEST_PUBLIC_KEY);
}

#[cfg(unix)]
#[test]
fn test_key_add_missing_field() {
    let t = Test::new();
    t.fake_kubectl();

    let output = t.run(&["key", "add", "-k", "key.txt"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "key key.txt not found");
}

#[cfg(unix)]
#[test]
fn test_key_add_reports_kubectl_failure() {
    let t = Test::new();
    t.script("kubectl", "echo 'secrets \"sops-age\" not found' >&2\nexit 1\n");

    let output = t.run(&["key", "add"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
    assert!(!t.config_path().exists());
}
