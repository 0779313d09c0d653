//! External editor handoff.
//!
//! The editor is taken from `KAGE_EDITOR`, `VISUAL` or `EDITOR` (first one
//! set wins), falling back to `nano` (`notepad` on Windows).
//!
//! - A value without spaces is run directly: `vim`.
//! - A value with spaces is split into arguments: `code --wait`.
//! - A value containing quotes or backslashes is handed to `sh -c` (`cmd /C`
//!   on Windows) with the quoted file path appended.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::constants;
use crate::error::{EditorError, Result};

/// Interactive editing of a file.
pub trait Editor {
    /// Open `path` in the editor, block until it exits and return the
    /// file's content afterwards.
    fn edit_file(&self, path: &Path) -> Result<Zeroizing<Vec<u8>>>;
}

/// Editor launched as a child process attached to the current terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEditor {
    args: Vec<String>,
    shell: bool,
}

impl ExternalEditor {
    /// Editor configured through the environment.
    pub fn from_env() -> Self {
        let configured = std::iter::once(constants::EDITOR_ENV)
            .chain(constants::FALLBACK_EDITOR_ENVS.iter().copied())
            .find_map(|var| {
                std::env::var(var)
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (var, v))
            });

        match configured {
            Some((var, value)) => {
                debug!(var, editor = %value, "editor from environment");
                Self::parse(&value)
            }
            None => Self::command(constants::DEFAULT_EDITOR, std::iter::empty::<String>()),
        }
    }

    /// Editor from a command line as it would appear in `$EDITOR`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if !value.contains(' ') {
            return Self::command(value, std::iter::empty::<String>());
        }
        if value.contains(['"', '\'', '\\']) {
            let (shell, flag) = if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") };
            return Self {
                args: vec![shell.to_string(), flag.to_string(), value.to_string()],
                shell: true,
            };
        }
        Self {
            args: value.split_whitespace().map(str::to_string).collect(),
            shell: false,
        }
    }

    /// Editor program with fixed leading arguments.
    pub fn command<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: std::iter::once(program.to_string())
                .chain(args.into_iter().map(Into::into))
                .collect(),
            shell: false,
        }
    }

    /// Program and arguments for editing `path`.
    fn build_args(&self, path: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        let path = path.display().to_string();
        if self.shell {
            if let Some(last) = args.last_mut() {
                *last = format!("{last} {}", quote(&path));
            }
        } else {
            args.push(path);
        }
        args
    }

    fn program(&self) -> Result<PathBuf> {
        let name = self.args.first().ok_or(EditorError::NotConfigured)?;
        which::which(name).map_err(|_| EditorError::NotFound(name.clone()).into())
    }
}

#[cfg(not(windows))]
fn quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

#[cfg(windows)]
fn quote(path: &str) -> String {
    format!("\"{path}\"")
}

impl Editor for ExternalEditor {
    fn edit_file(&self, path: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let program = self.program()?;

        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_err(EditorError::Launch)?.join(path)
        };
        if !path.exists() {
            return Err(EditorError::FileMissing(path).into());
        }

        let args = self.build_args(&path);
        debug!(program = %program.display(), "launching editor");

        let status = Command::new(&program)
            .args(&args[1..])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(EditorError::Launch)?;

        if !status.success() {
            return Err(EditorError::Exited(status).into());
        }

        let content = std::fs::read(&path).map_err(EditorError::ReadBack)?;
        debug!(len = content.len(), "editor finished");
        Ok(Zeroizing::new(content))
    }
}
