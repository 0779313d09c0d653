//! Error types.
//!
//! Each concern has its own enum; [`Error`] wraps them all so that `?`
//! works across module boundaries. Failures inside the edit pipeline are
//! additionally tagged with the [`EditStep`] that produced them.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A step of the edit pipeline failed.
    #[error("{step} failed: {source}")]
    Edit {
        step: EditStep,
        #[source]
        source: Box<Error>,
    },

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A context, field or file is absent.
    NotFound,
    /// Input was rejected before anything was mutated.
    Validation,
    /// Filesystem, subprocess or network failure.
    Io,
    /// Encryption or decryption failed.
    Crypto,
}

impl Error {
    /// Wrap this error with the edit step it came from.
    pub fn at(self, step: EditStep) -> Self {
        Error::Edit {
            step,
            source: Box::new(self),
        }
    }

    /// The edit step that failed, if this error came out of the edit pipeline.
    pub fn step(&self) -> Option<EditStep> {
        match self {
            Error::Edit { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Edit { source, .. } => source.kind(),
            Error::Store(StoreError::ContextNotFound(_)) => ErrorKind::NotFound,
            Error::Store(_) => ErrorKind::Io,
            Error::Key(KeyError::NoPrivateKey(_))
            | Error::Key(KeyError::NoCurrentContext)
            | Error::Key(KeyError::MarkerNotFound { .. }) => ErrorKind::NotFound,
            Error::Key(KeyError::InvalidFormat(_)) => ErrorKind::Validation,
            Error::Key(KeyError::Cluster { .. }) => ErrorKind::Io,
            Error::Cluster(ClusterError::FieldMissing { .. }) => ErrorKind::NotFound,
            Error::Cluster(_) => ErrorKind::Io,
            Error::Codec(CodecError::NoData)
            | Error::Codec(CodecError::FieldNotFound(_)) => ErrorKind::NotFound,
            Error::Codec(_) => ErrorKind::Validation,
            Error::Cipher(CipherError::ReadFailed { .. }) => ErrorKind::Io,
            Error::Cipher(_) => ErrorKind::Crypto,
            Error::Editor(EditorError::FileMissing(_)) => ErrorKind::NotFound,
            Error::Editor(_) => ErrorKind::Io,
            Error::Validation(ValidationError::FileNotFound(_)) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Json(_) => ErrorKind::Validation,
            Error::Prompt(_) | Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Steps of the secret edit pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStep {
    Decrypt,
    Decode,
    Edit,
    ReEncode,
    Encrypt,
    Commit,
}

impl fmt::Display for EditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditStep::Decrypt => "decrypt",
            EditStep::Decode => "decode",
            EditStep::Edit => "edit",
            EditStep::ReEncode => "re-encode",
            EditStep::Encrypt => "re-encrypt",
            EditStep::Commit => "write",
        };
        f.write_str(name)
    }
}

/// Key storage document errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("context {0} does not exist")]
    ContextNotFound(String),

    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to write key storage: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("failed to serialize key storage: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Key resolution errors.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("no private key found for context {0}")]
    NoPrivateKey(String),

    #[error("invalid age private key: {0}")]
    InvalidFormat(String),

    #[error("no current kubernetes context")]
    NoCurrentContext,

    #[error("no age private key found in {namespace}/{secret_name}:{key_name}")]
    MarkerNotFound {
        namespace: String,
        secret_name: String,
        key_name: String,
    },

    #[error("failed to fetch key for context {context}: {source}")]
    Cluster {
        context: String,
        #[source]
        source: ClusterError,
    },
}

/// Kubernetes access errors.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("kubectl not found in PATH")]
    KubectlNotFound,

    #[error("failed to run kubectl: {0}")]
    Launch(#[source] std::io::Error),

    #[error("kubectl {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("key {key_name} not found in secret {namespace}/{secret_name}")]
    FieldMissing {
        namespace: String,
        secret_name: String,
        key_name: String,
    },

    #[error("unexpected kubectl output: {0}")]
    InvalidResponse(String),
}

/// Partial-field codec errors.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to parse secret document: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("secret document is not a mapping")]
    NotAMapping,

    #[error("no data found in secret")]
    NoData,

    #[error("did not find data for key {0} in secret")]
    FieldNotFound(String),

    #[error("multiple data entries found in secret ({0}), pass a key to edit")]
    AmbiguousDefault(usize),

    #[error("data entry {0} is not a string")]
    NotAString(String),

    #[error("failed to decode base64 value for key {field}: {reason}")]
    InvalidBase64 { field: String, reason: String },

    #[error("failed to serialize secret document: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Encryption service errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("armor encoding failed: {0}")]
    ArmorFailed(String),

    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// External editor errors.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("no editor defined")]
    NotConfigured,

    #[error("editor {0} not found in PATH")]
    NotFound(String),

    #[error("failed to launch editor: {0}")]
    Launch(#[source] std::io::Error),

    #[error("editor exited with {0}")]
    Exited(std::process::ExitStatus),

    #[error("file does not exist: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("failed to read file after editing: {0}")]
    ReadBack(#[source] std::io::Error),
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("invalid storage mode: {0} (expected local or cluster)")]
    InvalidStorageMode(String),

    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{0} cannot be combined with {1}")]
    Conflicting(&'static str, &'static str),

    #[error("name must be specified")]
    EmptyName,

    #[error("invalid source {source_arg}: {reason}")]
    InvalidSource { source_arg: String, reason: String },

    #[error("{key:?} is not a valid key name for a Secret: {reason}")]
    InvalidKeyName { key: String, reason: String },

    #[error("cannot add key {0}, another key by that name already exists")]
    DuplicateKey(String),

    #[error("no contexts given (pass context names or --all)")]
    NothingToRemove,
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
