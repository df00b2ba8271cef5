// src/logging.rs

//! Logging setup for `runhub` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `RUNHUB_LOG`, a full `EnvFilter` directive (e.g. "runhub=debug,warn")
//! 3. `RUST_LOG`, same syntax
//! 4. default to `info`
//!
//! An unparsable directive is skipped in favour of the next source.
//! Logs go to STDERR; stdout carries the JSON event stream.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "RUNHUB_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let runhub_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(cli_level, runhub_log.as_deref(), rust_log.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

/// Pick the filter from the CLI flag and the two environment values.
pub fn resolve_filter(
    cli_level: Option<LogLevel>,
    runhub_log: Option<&str>,
    rust_log: Option<&str>,
) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(level_directive(lvl));
    }

    [runhub_log, rust_log]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .find_map(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
