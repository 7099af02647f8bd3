//! treceval CLI - TREC-style retrieval evaluation
//!
//! This binary provides the command-line interface for the evaluation engine.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treceval::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let outcome = treceval::run(&cli)?;
    debug!(?outcome, "finished");
    Ok(())
}

/// Initialize logging system
///
/// Logs go to stderr so that stdout carries only results. `RUST_LOG`
/// takes precedence over the verbosity flag.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "treceval_core={level},{}={level}",
            env!("CARGO_CRATE_NAME")
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
