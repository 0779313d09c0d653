//! Secret manifest construction.
//!
//! Builds a `v1/Secret` document from literals, files, directories and env
//! files the same way `kubectl create secret generic` does, without talking
//! to a cluster.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{Result, ValidationError};

const MAX_KEY_LEN: usize = 253;

/// One `--from-*` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// `key=value`
    Literal { key: String, value: String },
    /// `[key=]path`; directories expand to their regular files.
    File { key: Option<String>, path: PathBuf },
    /// File of `KEY=value` lines.
    EnvFile(PathBuf),
}

impl Source {
    /// Parse a `--from-literal` argument.
    pub fn literal(arg: &str) -> Result<Self> {
        match arg.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok(Source::Literal {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(invalid(arg, "expected key=value")),
        }
    }

    /// Parse a `--from-file` argument.
    pub fn file(arg: &str) -> Result<Self> {
        match arg.split_once('=') {
            None if arg.is_empty() => Err(invalid(arg, "file path cannot be empty")),
            None => Ok(Source::File {
                key: None,
                path: PathBuf::from(arg),
            }),
            Some((key, path)) => {
                if key.is_empty() {
                    return Err(invalid(arg, "key name for file path is missing"));
                }
                if path.is_empty() {
                    return Err(invalid(arg, "file path for key name is missing"));
                }
                if path.contains('=') {
                    return Err(invalid(arg, "key names or file paths cannot contain '='"));
                }
                Ok(Source::File {
                    key: Some(key.to_string()),
                    path: PathBuf::from(path),
                })
            }
        }
    }

    /// Parse a `--from-env-file` argument.
    pub fn env_file(arg: &str) -> Result<Self> {
        if arg.is_empty() {
            return Err(invalid(arg, "file path cannot be empty"));
        }
        Ok(Source::EnvFile(PathBuf::from(arg)))
    }
}

fn invalid(arg: &str, reason: &str) -> crate::error::Error {
    ValidationError::InvalidSource {
        source_arg: arg.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Inputs of `secret create`.
#[derive(Debug, Clone, Default)]
pub struct SecretSpec {
    pub name: String,
    pub namespace: Option<String>,
    pub secret_type: Option<String>,
    pub sources: Vec<Source>,
    pub append_hash: bool,
}

/// A built Secret.
#[derive(Debug, Clone)]
pub struct SecretManifest {
    pub name: String,
    pub namespace: String,
    pub secret_type: Option<String>,
    data: BTreeMap<String, Zeroizing<Vec<u8>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretObject<'a> {
    api_version: &'static str,
    data: BTreeMap<&'a str, String>,
    kind: &'static str,
    metadata: Metadata<'a>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    secret_type: Option<&'a str>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    name: &'a str,
    namespace: &'a str,
}

impl SecretManifest {
    /// Build the Secret described by `spec`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty name, env files combined
    /// with other sources, invalid or duplicate keys, and unreadable files.
    pub fn build(spec: &SecretSpec) -> Result<Self> {
        if spec.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let has_env = spec.sources.iter().any(|s| matches!(s, Source::EnvFile(_)));
        let has_other = spec.sources.iter().any(|s| !matches!(s, Source::EnvFile(_)));
        if has_env && has_other {
            return Err(ValidationError::Conflicting(
                "--from-env-file",
                "--from-file or --from-literal",
            )
            .into());
        }

        let mut manifest = SecretManifest {
            name: spec.name.trim().to_string(),
            namespace: spec
                .namespace
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(constants::DEFAULT_SECRET_NAMESPACE)
                .to_string(),
            secret_type: spec.secret_type.clone().filter(|t| !t.is_empty()),
            data: BTreeMap::new(),
        };

        for source in &spec.sources {
            match source {
                Source::Literal { key, value } => manifest.insert(key, value.as_bytes().to_vec())?,
                Source::File { key, path } => manifest.add_file_source(key.as_deref(), path)?,
                Source::EnvFile(path) => manifest.add_env_file(path)?,
            }
        }

        if spec.append_hash {
            let hash = manifest.content_hash()?;
            manifest.name = format!("{}-{hash}", manifest.name);
        }

        debug!(name = %manifest.name, keys = manifest.data.len(), "secret built");
        Ok(manifest)
    }

    /// Keys of the Secret, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        validate_key(key)?;
        if self.data.contains_key(key) {
            return Err(ValidationError::DuplicateKey(key.to_string()).into());
        }
        self.data.insert(key.to_string(), Zeroizing::new(value));
        Ok(())
    }

    fn add_file_source(&mut self, key: Option<&str>, path: &Path) -> Result<()> {
        let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;

        if !metadata.is_dir() {
            let key = match key {
                Some(key) => key.to_string(),
                None => file_key(path)?,
            };
            let content = std::fs::read(path).map_err(|e| read_error(path, e))?;
            return self.insert(&key, content);
        }

        if key.is_some() {
            return Err(invalid(
                &path.display().to_string(),
                "cannot give a key name for a directory path",
            ));
        }

        let mut entries = std::fs::read_dir(path)
            .map_err(|e| read_error(path, e))?
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|e| read_error(path, e))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            if !entry.file_type().map_err(|e| read_error(path, e))?.is_file() {
                continue;
            }
            let item = entry.path();
            let content = std::fs::read(&item).map_err(|e| read_error(&item, e))?;
            self.insert(&entry.file_name().to_string_lossy(), content)?;
        }
        Ok(())
    }

    fn add_env_file(&mut self, path: &Path) -> Result<()> {
        let metadata = std::fs::metadata(path).map_err(|e| read_error(path, e))?;
        if metadata.is_dir() {
            return Err(invalid(
                &path.display().to_string(),
                "env secret file cannot be a directory",
            ));
        }
        let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| read_error(path, e))?);

        for (key, value) in parse_env_file(&contents)? {
            self.insert(&key, value.into_bytes())?;
        }
        Ok(())
    }

    fn object(&self) -> SecretObject<'_> {
        SecretObject {
            api_version: "v1",
            data: self
                .data
                .iter()
                .map(|(k, v)| (k.as_str(), STANDARD.encode(v.as_slice())))
                .collect(),
            kind: "Secret",
            metadata: Metadata {
                name: &self.name,
                namespace: &self.namespace,
            },
            secret_type: self.secret_type.as_deref(),
        }
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<Zeroizing<String>> {
        serde_yaml::to_string(&self.object())
            .map(Zeroizing::new)
            .map_err(|e| crate::error::CodecError::Serialize(e).into())
    }

    /// 10-character content hash, compatible with `kubectl --append-hash`.
    fn content_hash(&self) -> Result<String> {
        let data: BTreeMap<&str, String> = self
            .data
            .iter()
            .map(|(k, v)| (k.as_str(), STANDARD.encode(v.as_slice())))
            .collect();
        let mut doc = BTreeMap::new();
        doc.insert("data", serde_json::to_value(data)?);
        doc.insert("kind", "Secret".into());
        doc.insert("name", self.name.clone().into());
        doc.insert("type", self.secret_type.clone().unwrap_or_default().into());

        let encoded = Zeroizing::new(serde_json::to_string(&doc)?);
        let digest = format!("{:x}", Sha256::digest(encoded.as_bytes()));

        Ok(digest
            .chars()
            .take(10)
            .map(|c| match c {
                '0' => 'g',
                '1' => 'h',
                '3' => 'k',
                'a' => 'm',
                'e' => 't',
                other => other,
            })
            .collect())
    }
}

fn read_error(path: &Path, e: std::io::Error) -> crate::error::Error {
    if e.kind() == std::io::ErrorKind::NotFound {
        return ValidationError::FileNotFound(path.to_path_buf()).into();
    }
    invalid(&path.display().to_string(), &format!("error reading file: {e}"))
}

fn file_key(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| invalid(&path.display().to_string(), "cannot derive a key name from path"))
}

/// Check that `key` is usable as a Secret data key.
pub fn validate_key(key: &str) -> Result<()> {
    let reason = if key.len() > MAX_KEY_LEN {
        Some(format!("must be no more than {MAX_KEY_LEN} characters"))
    } else if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        Some("must consist of alphanumeric characters, '-', '_' or '.'".to_string())
    } else if key == "." || key == ".." || key.starts_with("..") {
        Some("must not be '.' or '..' or start with '..'".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidKeyName {
            key: key.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}

/// Parse `KEY=value` lines.
///
/// Blank lines and `#` comments are skipped, leading whitespace is ignored
/// and values are taken verbatim. A bare `KEY` takes its value from the
/// environment and is skipped when unset.
pub fn parse_env_file(contents: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for (number, line) in contents.lines().enumerate() {
        let line = if number == 0 {
            line.trim_start_matches('\u{feff}')
        } else {
            line
        };
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (line.trim_end(), None),
        };

        if !is_env_var_name(key) {
            return Err(ValidationError::InvalidKeyName {
                key: key.to_string(),
                reason: format!("not a valid environment variable name (line {})", number + 1),
            }
            .into());
        }

        match value.or_else(|| std::env::var(key).ok()) {
            Some(value) => pairs.push((key.to_string(), value)),
            None => debug!(key, "skipping unset variable"),
        }
    }

    Ok(pairs)
}

fn is_env_var_name(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || matches!(c, '-' | '_' | '.') => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
