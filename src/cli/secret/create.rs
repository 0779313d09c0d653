//! Secret create command.
//!
//! Build a Secret from literals, files and env files and write it encrypted.

use std::io::{self, Write};

use tracing::debug;

use crate::cli::{key_manager, output, CreateArgs};
use crate::core::cipher::{Age, Cipher};
use crate::core::constants;
use crate::core::fs::atomic_write;
use crate::core::keys::KeySource;
use crate::core::secret::{SecretManifest, SecretSpec, Source};
use crate::error::Result;

fn spec(args: &CreateArgs) -> Result<SecretSpec> {
    let mut sources = Vec::new();
    for arg in &args.from_file {
        sources.push(Source::file(arg)?);
    }
    for arg in &args.from_literal {
        sources.push(Source::literal(arg)?);
    }
    for arg in &args.from_env_file {
        sources.push(Source::env_file(arg)?);
    }

    Ok(SecretSpec {
        name: args.name.clone(),
        namespace: Some(args.namespace.clone()),
        secret_type: args.secret_type.clone(),
        sources,
        append_hash: args.append_hash,
    })
}

/// Create an encrypted Secret for `context` (or the current context).
pub fn execute(context: Option<&str>, args: &CreateArgs) -> Result<()> {
    let manifest = SecretManifest::build(&spec(args)?)?;
    let yaml = manifest.to_yaml()?;

    let manager = key_manager()?;
    let context = manager.resolve_context(context)?;
    let recipient = manager.recipient(&context)?;
    let encrypted = Age.encrypt_data(yaml.as_bytes(), &recipient)?;
    debug!(context = %context, name = %manifest.name, "secret encrypted");

    match &args.output {
        Some(path) => {
            atomic_write(path, &encrypted, constants::PRIVATE_FILE_MODE)?;
            output::success(&format!(
                "created {} in {}",
                output::key(&manifest.name),
                output::path(path.display())
            ));
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&encrypted)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
