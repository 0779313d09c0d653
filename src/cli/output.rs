//! Shared CLI output helpers.
//!
//! Status lines go to stderr so that stdout carries only data (decrypted
//! documents, manifests, JSON). Colors follow `console`'s terminal detection
//! and are off when `NO_COLOR` is set.

use std::fmt::Display;

use console::{style, StyledObject};

const RULE_WIDTH: usize = 56;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn styled<D>(value: D) -> StyledObject<D> {
    let s = style(value);
    if colors_enabled() {
        s
    } else {
        s.force_styling(false)
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ key imported for prod`
pub fn success(msg: &str) {
    eprintln!("{} {}", styled("✓").green(), msg);
}

/// Print an error message (red).
pub fn error(msg: &str) {
    eprintln!("{} {}", styled("✗").red(), msg);
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    eprintln!("{} {}", styled("⚠").yellow(), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run with --help for usage`
pub fn hint(msg: &str) {
    eprintln!("{} {}", styled("→").cyan(), styled(msg).cyan());
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    eprintln!("{}", styled(msg).dim());
}

/// Print a bold header.
pub fn header(title: &str) {
    println!("{}", styled(title).bold());
}

/// Print a horizontal rule.
pub fn rule() {
    println!("{}", styled("─".repeat(RULE_WIDTH)).dim());
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", styled(label).dim(), styled(value.to_string()).bold());
}

/// Print raw data to stdout.
pub fn data(content: &str) {
    println!("{content}");
}

/// Print an empty line.
pub fn blank() {
    println!();
}

/// Format a context or field name in cyan.
pub fn key(k: &str) -> String {
    styled(k).cyan().to_string()
}

/// Format a path in cyan.
pub fn path(p: impl Display) -> String {
    styled(p.to_string()).cyan().to_string()
}

/// Format a command in green.
pub fn cmd(c: &str) -> String {
    styled(c).green().to_string()
}

/// Format a missing value in red.
pub fn missing(label: &str) -> String {
    styled(label).red().to_string()
}
