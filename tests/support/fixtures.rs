//! Test fixtures and constants.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Context used by most tests.
pub const TEST_CONTEXT: &str = "test";

/// A valid age private key.
pub const TEST_KEY: &str = "AGE-SECRET-KEY-13ZLWP4WFHQ6VHC2J5YYEUCFKGLZTD3SXQQPEGK3WU2M8FKYC238S7ZKNSV";

/// Public key of [`TEST_KEY`].
pub const TEST_PUBLIC_KEY: &str = "age1qnswq576pku84s2wyw4kr59ywvvdzua6crtdz0sf0l9udnje6c5snqfc2d";

/// Key file as generated by `age-keygen`.
pub const KEY_FILE: &str = "# created: 2024-01-01T00:00:00Z\n\
# public key: age1qnswq576pku84s2wyw4kr59ywvvdzua6crtdz0sf0l9udnje6c5snqfc2d\n\
AGE-SECRET-KEY-13ZLWP4WFHQ6VHC2J5YYEUCFKGLZTD3SXQQPEGK3WU2M8FKYC238S7ZKNSV\n";

/// Secret with a single data field holding `a: 1`.
pub const SINGLE_FIELD_SECRET: &str = "apiVersion: v1\n\
kind: Secret\n\
metadata:\n  name: app-config\n\
data:\n  config.yaml: YTogMQo=\n";

/// Secret with two data fields.
pub const TWO_FIELD_SECRET: &str = "apiVersion: v1\n\
kind: Secret\n\
metadata:\n  name: credentials\n\
data:\n  username: YWRtaW4=\n  password: aHVudGVyMg==\n";

/// Key storage document with one local key.
pub fn local_config(context: &str, key: &str) -> String {
    format!("storageMode: local\ncontexts:\n  {context}:\n    privateKey: {key}\n")
}

/// `kubectl get secret -o json` output with one data field.
pub fn kubectl_secret_json(field: &str, value: &str) -> String {
    format!(
        "{{\"apiVersion\":\"v1\",\"kind\":\"Secret\",\"data\":{{\"{field}\":\"{}\"}}}}",
        STANDARD.encode(value)
    )
}

/// Base64 of `value`, as stored in a Secret.
pub fn b64(value: &str) -> String {
    STANDARD.encode(value)
}
