//! Kage - Edit age-encrypted Kubernetes secrets with per-cluster keys.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kage::cli::output;
use kage::cli::{execute, Cli};
use kage::error::{Error, KeyError, ValidationError};

fn suggestion(e: &Error) -> Option<&'static str> {
    let e = match e {
        Error::Edit { source, .. } => source.as_ref(),
        other => other,
    };
    match e {
        Error::Key(KeyError::NoPrivateKey(_)) => Some("run: kage key add"),
        Error::Key(KeyError::NoCurrentContext) => Some("pass --cluster <context>"),
        Error::Validation(ValidationError::NothingToRemove) => Some("run: kage key list"),
        _ => None,
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env("KAGE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kage=debug")
        } else {
            EnvFilter::new("kage=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::hint(hint);
        }
        output::hint("run with --help for usage");
        std::process::exit(1);
    }
}
