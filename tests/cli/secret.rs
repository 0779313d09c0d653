//! Tests for `kage secret edit/decrypt/create` commands.

use crate::support::*;

#[test]
fn test_decrypt_prints_document() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);

    let output = t.decrypt(&file);
    assert_success(&output);
    assert_eq!(stdout(&output), SINGLE_FIELD_SECRET);
}

#[test]
fn test_decrypt_missing_file() {
    let t = Test::with_key();

    let output = t.decrypt(&t.path("missing.age"));
    assert_failure(&output);
    assert_stderr_contains(&output, "file does not exist");
}

#[test]
fn test_decrypt_directory_is_rejected() {
    let t = Test::with_key();

    let output = t.decrypt(t.dir.path());
    assert_failure(&output);
    assert_stderr_contains(&output, "file does not exist");
}

#[test]
fn test_decrypt_without_key_suggests_add() {
    let t = Test::new();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);

    let output = t.decrypt(&file);
    assert_failure(&output);
    assert_stderr_contains(&output, "no private key found for context test");
    assert_stderr_contains(&output, "kage key add");
}

#[test]
fn test_decrypt_garbage_reports_step() {
    let t = Test::with_key();
    let file = t.path("garbage.age");
    std::fs::write(&file, "not encrypted").unwrap();

    let output = t.decrypt(&file);
    assert_failure(&output);
    assert_stderr_contains(&output, "decrypt failed");
}

#[cfg(unix)]
#[test]
fn test_edit_unchanged_leaves_file_alone() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let before = std::fs::read(&file).unwrap();
    let editor = t.editor("exit 0\n");

    let output = t.edit(&editor, &file, &[]);
    assert_success(&output);
    assert_stderr_contains(&output, "No changes made to the file");
    assert_file_bytes(&file, &before);
}

#[cfg(unix)]
#[test]
fn test_edit_whole_document() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let editor = t.editor(
        "basename \"$1\" > \"$HOME/edited-name\"\n\
         printf 'apiVersion: v1\\nkind: Secret\\nmetadata:\\n  name: renamed\\n' > \"$1\"\n",
    );

    let output = t.edit(&editor, &file, &[]);
    assert_success(&output);
    assert_stderr_contains(&output, "File edited and encrypted successfully");

    let decrypted = t.decrypt_file(&file);
    assert_eq!(
        decrypted,
        "apiVersion: v1\nkind: Secret\nmetadata:\n  name: renamed\n"
    );
    let name = std::fs::read_to_string(t.home.path().join("edited-name")).unwrap();
    assert_eq!(name.trim(), "decrypted_secret.yaml");
}

#[cfg(unix)]
#[test]
fn test_edit_named_field() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let editor = t.editor(
        "[ \"$(cat \"$1\")\" = 'a: 1' ] || exit 3\n\
         basename \"$1\" > \"$HOME/edited-name\"\n\
         printf 'a: 2\\n' > \"$1\"\n",
    );

    let output = t.edit(&editor, &file, &["-k", "config.yaml"]);
    assert_success(&output);
    assert_stderr_contains(&output, "File edited and encrypted successfully");

    let decrypted = t.decrypt_file(&file);
    assert!(decrypted.contains(&format!("config.yaml: {}", b64("a: 2\n"))));
    assert!(decrypted.contains("name: app-config"));

    let name = std::fs::read_to_string(t.home.path().join("edited-name")).unwrap();
    assert_eq!(name.trim(), "config.yaml");
}

#[cfg(unix)]
#[test]
fn test_edit_decode_picks_only_field() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let editor = t.editor("printf 'a: 3\\n' > \"$1\"\n");

    let output = t.edit(&editor, &file, &["-d"]);
    assert_success(&output);
    assert!(t
        .decrypt_file(&file)
        .contains(&format!("config.yaml: {}", b64("a: 3\n"))));
}

#[cfg(unix)]
#[test]
fn test_edit_decode_ambiguous_without_terminal() {
    let t = Test::with_key();
    let file = t.encrypted_file("creds.yaml.age", TWO_FIELD_SECRET);
    let before = std::fs::read(&file).unwrap();
    let editor = t.editor("printf 'changed' > \"$1\"\n");

    let output = t.edit(&editor, &file, &["-d"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "multiple data entries found");
    assert_file_bytes(&file, &before);
}

#[cfg(unix)]
#[test]
fn test_edit_one_of_several_fields() {
    let t = Test::with_key();
    let file = t.encrypted_file("creds.yaml.age", TWO_FIELD_SECRET);
    let editor = t.editor("printf 'correct-horse' > \"$1\"\n");

    let output = t.edit(&editor, &file, &["-k", "password"]);
    assert_success(&output);

    let decrypted = t.decrypt_file(&file);
    assert!(decrypted.contains(&format!("password: {}", b64("correct-horse"))));
    assert!(decrypted.contains(&format!("username: {}", b64("admin"))));
}

#[cfg(unix)]
#[test]
fn test_edit_unknown_field() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let before = std::fs::read(&file).unwrap();
    let editor = t.editor("exit 0\n");

    let output = t.edit(&editor, &file, &["-k", "missing"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "did not find data for key missing");
    assert_file_bytes(&file, &before);
}

#[cfg(unix)]
#[test]
fn test_edit_editor_failure_keeps_file() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let before = std::fs::read(&file).unwrap();
    let editor = t.editor(
        "dirname \"$1\" > \"$HOME/edit-dir\"\nprintf 'half-written' > \"$1\"\nexit 1\n",
    );

    let output = t.edit(&editor, &file, &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "edit failed");
    assert_file_bytes(&file, &before);

    let dir = std::fs::read_to_string(t.home.path().join("edit-dir")).unwrap();
    assert!(!std::path::Path::new(dir.trim()).exists());
}

#[cfg(unix)]
#[test]
fn test_edit_workspace_is_removed() {
    let t = Test::with_key();
    let file = t.encrypted_file("app.yaml.age", SINGLE_FIELD_SECRET);
    let editor = t.editor("dirname \"$1\" > \"$HOME/edit-dir\"\nprintf 'x' > \"$1\"\n");

    assert_success(&t.edit(&editor, &file, &[]));

    let dir = std::fs::read_to_string(t.home.path().join("edit-dir")).unwrap();
    assert!(!std::path::Path::new(dir.trim()).exists());
}

#[test]
fn test_create_to_file() {
    let t = Test::with_key();
    let out = t.path("app.yaml.age");

    let output = t.run(&[
        "secret",
        "create",
        "app",
        "--from-literal",
        "user=admin",
        "--from-literal",
        "password=hunter2",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_success(&output);

    let decrypted = t.decrypt_file(&out);
    assert!(decrypted.contains("kind: Secret"));
    assert!(decrypted.contains("name: app\n"));
    assert!(decrypted.contains("namespace: default"));
    assert!(decrypted.contains(&format!("user: {}", b64("admin"))));
    assert!(decrypted.contains(&format!("password: {}", b64("hunter2"))));
}

#[test]
fn test_create_to_stdout_is_armored() {
    let t = Test::with_key();

    let output = t.run(&["secret", "create", "app", "--from-literal", "k=v"]);
    assert_success(&output);
    assert_stdout_contains(&output, "-----BEGIN AGE ENCRYPTED FILE-----");
    assert_stdout_excludes(&output, "kind: Secret");
}

#[test]
fn test_create_without_key_reports_missing_key() {
    let t = Test::new();
    let out = t.path("app.yaml.age");

    let output = t.run(&[
        "secret",
        "create",
        "app",
        "--from-literal",
        "k=v",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no private key found for context test");
    assert!(!stderr(&output).contains("re-encrypt"));
    assert!(!out.exists());
}

#[test]
fn test_create_from_files_and_env_file() {
    let t = Test::with_key();
    std::fs::write(t.path("tls.crt"), "cert").unwrap();
    std::fs::write(t.path("app.env"), "# comment\nLOG_LEVEL=debug\n").unwrap();

    let out = t.path("files.age");
    let output = t.run(&[
        "secret",
        "create",
        "files",
        "--from-file",
        "tls.crt",
        "-n",
        "web",
        "--type",
        "kubernetes.io/tls",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_success(&output);
    let decrypted = t.decrypt_file(&out);
    assert!(decrypted.contains(&format!("tls.crt: {}", b64("cert"))));
    assert!(decrypted.contains("namespace: web"));
    assert!(decrypted.contains("type: kubernetes.io/tls"));

    let out = t.path("env.age");
    let output = t.run(&[
        "secret",
        "create",
        "env",
        "--from-env-file",
        "app.env",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_success(&output);
    assert!(t
        .decrypt_file(&out)
        .contains(&format!("LOG_LEVEL: {}", b64("debug"))));
}

#[test]
fn test_create_append_hash() {
    let t = Test::with_key();
    let out = t.path("hashed.age");

    let output = t.run(&[
        "secret",
        "create",
        "app",
        "--from-literal",
        "k=v",
        "--append-hash",
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_success(&output);

    let decrypted = t.decrypt_file(&out);
    let name = decrypted
        .lines()
        .find_map(|l| l.trim().strip_prefix("name: "))
        .unwrap();
    assert!(name.starts_with("app-"));
    assert_eq!(name.len(), "app-".len() + 10);
}

#[test]
fn test_create_env_file_conflicts_with_literals() {
    let t = Test::with_key();
    std::fs::write(t.path("app.env"), "A=1\n").unwrap();

    let output = t.run(&[
        "secret",
        "create",
        "app",
        "--from-env-file",
        "app.env",
        "--from-literal",
        "b=2",
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot be combined");
}

#[test]
fn test_create_rejects_invalid_key_name() {
    let t = Test::with_key();

    let output = t.run(&["secret", "create", "app", "--from-literal", "bad key=v"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is not a valid key name");
}

#[test]
fn test_create_rejects_duplicate_keys() {
    let t = Test::with_key();

    let output = t.run(&[
        "secret",
        "create",
        "app",
        "--from-literal",
        "k=1",
        "--from-literal",
        "k=2",
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "another key by that name already exists");
}
