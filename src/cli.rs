// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `runhub`.
///
/// The binary is a small harness: it starts one run, feeds it from a
/// scripted driver and streams every event to stdout as JSON lines.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "runhub",
    version,
    about = "Stream the progress of a scripted optimization run.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file at the default location falls back to built-in
    /// defaults; an explicitly given path must exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// JSON-lines driver script to replay into the run.
    #[arg(long, value_name = "PATH")]
    pub script: String,

    /// Project the run is registered under.
    #[arg(long, value_name = "ID", default_value = "default")]
    pub project: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNHUB_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate config and script, print the steps, but don't start a run.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
