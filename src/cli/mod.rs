//! Command-line interface.

pub mod completions;
pub mod key;
pub mod output;
pub mod secret;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::cluster::Kubectl;
use crate::core::constants;
use crate::core::keys::KeyManager;
use crate::core::store::Filesystem;
use crate::error::Result;

/// kage - Edit age-encrypted Kubernetes secrets with per-cluster keys.
#[derive(Parser)]
#[command(
    name = "kage",
    about = "Edit age-encrypted Kubernetes secrets with per-cluster keys",
    version
)]
pub struct Cli {
    /// Kubernetes context whose key to use (defaults to the current context)
    #[arg(short, long, global = true, env = "KAGE_CLUSTER")]
    pub cluster: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Manage per-cluster age keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Work with encrypted secret files
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Key subcommands.
#[derive(Subcommand)]
pub enum KeyAction {
    /// Import the age key of a cluster from one of its Secrets
    Add {
        /// Namespace of the Secret holding the key
        #[arg(short, long, default_value = constants::DEFAULT_KEY_NAMESPACE)]
        namespace: String,
        /// Name of the Secret holding the key
        #[arg(short, long, default_value = constants::DEFAULT_KEY_SECRET)]
        secret: String,
        /// Data field of the Secret holding the key file
        #[arg(short, long, default_value = constants::DEFAULT_KEY_FIELD)]
        key: String,
    },

    /// List stored contexts and their public keys
    List {
        /// Also print private keys
        #[arg(long)]
        show_sensitive: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove stored keys
    #[command(alias = "rm")]
    Remove {
        /// Contexts to remove
        contexts: Vec<String>,
        /// Remove every context
        #[arg(long, conflicts_with = "contexts")]
        all: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or change where keys are kept (local or cluster)
    StorageMode {
        /// New storage mode
        #[arg(short, long, visible_alias = "set-storage-mode", value_name = "MODE")]
        set: Option<String>,
    },
}

/// Secret subcommands.
#[derive(Subcommand)]
pub enum SecretAction {
    /// Decrypt a secret, edit it and encrypt it again
    Edit {
        /// Encrypted secret file
        file: PathBuf,
        #[command(flatten)]
        decode: DecodeArgs,
    },

    /// Print a decrypted secret
    Decrypt {
        /// Encrypted secret file
        file: PathBuf,
    },

    /// Create an encrypted Secret from literals, files or env files
    Create(CreateArgs),
}

/// Field-level editing options.
#[derive(Args, Debug, Clone, Default)]
pub struct DecodeArgs {
    /// Edit one base64 data field as plain text
    #[arg(short, long)]
    pub decode: bool,

    /// Data field to edit (implies --decode)
    #[arg(short, long, value_name = "FIELD")]
    pub key: Option<String>,
}

/// `secret create` options.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Secret name
    pub name: String,

    /// Literal value, as key=value
    #[arg(long = "from-literal", value_name = "KEY=VALUE")]
    pub from_literal: Vec<String>,

    /// File or directory, optionally with a key name as key=path
    #[arg(long = "from-file", value_name = "[KEY=]PATH", value_delimiter = ',')]
    pub from_file: Vec<String>,

    /// File of KEY=value lines
    #[arg(long = "from-env-file", value_name = "PATH", value_delimiter = ',')]
    pub from_env_file: Vec<String>,

    /// Secret type
    #[arg(long = "type")]
    pub secret_type: Option<String>,

    /// Namespace of the Secret
    #[arg(short, long, default_value = constants::DEFAULT_SECRET_NAMESPACE)]
    pub namespace: String,

    /// Append a hash of the content to the name
    #[arg(long)]
    pub append_hash: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Key manager over the per-user key storage and `kubectl`.
pub fn key_manager() -> Result<KeyManager> {
    KeyManager::new(
        Box::new(Filesystem::default_location()?),
        Box::new(Kubectl::default()),
        Box::new(Kubectl::default()),
    )
}

/// Execute a command.
pub fn execute(cli: Cli) -> Result<()> {
    let cluster = cli.cluster.as_deref();

    match cli.command {
        Command::Key { action } => match action {
            KeyAction::Add {
                namespace,
                secret,
                key,
            } => key::add::execute(cluster, &namespace, &secret, &key),
            KeyAction::List {
                show_sensitive,
                json,
            } => key::list::execute(show_sensitive, json),
            KeyAction::Remove { contexts, all, yes } => key::remove::execute(&contexts, all, yes),
            KeyAction::StorageMode { set } => key::storage::execute(set.as_deref()),
        },
        Command::Secret { action } => match action {
            SecretAction::Edit { file, decode } => secret::edit::execute(cluster, &file, &decode),
            SecretAction::Decrypt { file } => secret::decrypt::execute(cluster, &file),
            SecretAction::Create(args) => secret::create::execute(cluster, &args),
        },
        Command::Completions { shell } => completions::execute(shell),
    }
}
