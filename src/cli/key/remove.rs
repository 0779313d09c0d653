//! Key remove command.
//!
//! Remove stored contexts, or all of them with `--all`.

use std::io::{self, IsTerminal};

use dialoguer::Confirm;

use crate::cli::{key_manager, output};
use crate::error::{Result, ValidationError};

/// Remove the named contexts, or every context.
pub fn execute(contexts: &[String], all: bool, yes: bool) -> Result<()> {
    let manager = key_manager()?;

    if all {
        if !yes && io::stdin().is_terminal() && !confirm_all()? {
            output::dimmed("aborted");
            return Ok(());
        }
        let removed = manager.remove_all()?;
        if removed.is_empty() {
            output::dimmed("no contexts stored");
        } else {
            output::success(&format!("removed {} contexts", removed.len()));
        }
        return Ok(());
    }

    if contexts.is_empty() {
        return Err(ValidationError::NothingToRemove.into());
    }

    for name in contexts {
        manager.remove_context(name)?;
        output::success(&format!("removed {}", output::key(name)));
    }

    Ok(())
}

fn confirm_all() -> Result<bool> {
    output::warn("this removes every stored key and cluster reference");
    Ok(Confirm::new()
        .with_prompt("Remove all contexts?")
        .default(false)
        .interact()?)
}
