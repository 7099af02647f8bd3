//! Library interface for the treceval CLI
//!
//! This module exposes the argument handling and the evaluation driver for
//! integration testing while keeping the binary entry point in main.rs.

pub mod app;
pub mod args;

pub use app::{active_options, exporter_for, resolve_config, run, Outcome};
pub use args::Cli;
