//! Kubernetes access.
//!
//! Only two things are needed from a cluster: the raw value of one field of
//! one Secret, and the name of the current kubeconfig context. Both go through
//! the `kubectl` binary so that the operator's kubeconfig, auth plugins and
//! proxies apply unchanged.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use base64::Engine;
use serde::Deserialize;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::core::domain::ClusterReference;
use crate::error::{ClusterError, Result};

/// Fetches the raw contents of a field of a cluster Secret.
pub trait ClusterKeyFetch {
    /// Return the decoded value of `reference.key_name` in the Secret
    /// `reference.secret_name` of `reference.namespace` in `context`.
    fn fetch(&self, context: &str, reference: &ClusterReference) -> Result<Zeroizing<String>>;
}

/// Supplies the context to use when none is given.
pub trait ContextResolver {
    fn current_context(&self) -> Result<String>;
}

#[derive(Deserialize)]
struct SecretObject {
    #[serde(default)]
    data: BTreeMap<String, String>,
}

/// `kubectl`-backed cluster access.
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: PathBuf,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::at("kubectl")
    }
}

impl Kubectl {
    /// Use a specific binary (a bare name is looked up on `PATH`).
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        let path = which::which(&self.program).map_err(|_| ClusterError::KubectlNotFound)?;
        trace!(path = %path.display(), "using kubectl");
        Ok(path)
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        trace!(args = ?args, "running kubectl");

        let output = Command::new(self.locate()?)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(ClusterError::Launch)?;

        if !output.status.success() {
            return Err(ClusterError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(output.stdout)
    }
}

impl ClusterKeyFetch for Kubectl {
    fn fetch(&self, context: &str, reference: &ClusterReference) -> Result<Zeroizing<String>> {
        debug!(context, secret = %reference, "fetching key from cluster");

        let stdout = Zeroizing::new(self.run(&[
            "--context",
            context,
            "--namespace",
            &reference.namespace,
            "get",
            "secret",
            &reference.secret_name,
            "--output",
            "json",
        ])?);

        let secret: SecretObject = serde_json::from_slice(&stdout)
            .map_err(|e| ClusterError::InvalidResponse(e.to_string()))?;

        decode_field(&secret.data, reference)
    }
}

impl ContextResolver for Kubectl {
    fn current_context(&self) -> Result<String> {
        let stdout = self.run(&["config", "current-context"])?;
        let name = String::from_utf8_lossy(&stdout).trim().to_string();
        if name.is_empty() {
            return Err(ClusterError::InvalidResponse("empty current context".into()).into());
        }
        Ok(name)
    }
}

fn decode_field(
    data: &BTreeMap<String, String>,
    reference: &ClusterReference,
) -> Result<Zeroizing<String>> {
    let encoded = data
        .get(&reference.key_name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ClusterError::FieldMissing {
            namespace: reference.namespace.clone(),
            secret_name: reference.secret_name.clone(),
            key_name: reference.key_name.clone(),
        })?;

    let bytes = Zeroizing::new(
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| ClusterError::InvalidResponse(format!("{}: {e}", reference.key_name)))?,
    );
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| ClusterError::InvalidResponse(format!("{}: {e}", reference.key_name)))?;
    Ok(Zeroizing::new(text.to_string()))
}
