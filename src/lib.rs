// src/lib.rs

pub mod cli;
pub mod config;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::driver::{DriverStep, ScriptedDriver};

pub use crate::engine::{
    IngestOutcome, ListenerHandle, RunEngine, RunListener, RunSummary, Subscription, Unsubscribe,
};
pub use crate::events::RunEvent;
pub use crate::types::{LogLevel, ProjectId, RunId, RunStatus};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the scripted driver
/// - the engine, one run and one subscription printing to stdout
/// - Ctrl-C handling (aborts the run)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_or_default(args.config.as_deref().map(Path::new))?;
    let steps = driver::load_script(&args.script)?;

    if args.dry_run {
        print_dry_run(&cfg, &steps);
        return Ok(());
    }

    let driver = ScriptedDriver::new(steps, cfg.step_delay());
    let engine = RunEngine::with_driver(cfg.engine_config(), Arc::new(driver));
    let project = ProjectId::new(args.project);

    let run_id = engine.start(project.clone(), json!({ "script": args.script }));
    let mut subscription = engine.subscribe(run_id)?;

    // Ctrl-C → abort.
    {
        let engine = engine.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            if !engine.abort(run_id) {
                warn!(%run_id, "Ctrl-C received but run was already finished");
            }
        });
    }

    while let Some(event) = subscription.recv().await {
        println!("{}", serde_json::to_string(&event)?);

        if event.as_status().is_some_and(RunStatus::is_terminal) {
            break;
        }
    }

    if let Some(summary) = engine.summary(run_id) {
        info!(
            %run_id,
            status = %summary.status,
            events = summary.event_count,
            "run finished"
        );
    }

    drop(subscription);
    for retained in engine.list_by_project(&project) {
        info!(
            run_id = %retained.run_id,
            status = %retained.status,
            subscribers = retained.subscribers,
            "run still retained"
        );
    }
    debug!(%project, "subscription closed");

    Ok(())
}

fn print_dry_run(cfg: &ConfigFile, steps: &[DriverStep]) {
    println!("runhub dry-run");
    println!("  engine:");
    match cfg.engine.history_limit {
        Some(limit) => println!("    history_limit: {limit}"),
        None => println!("    history_limit: unbounded"),
    }
    println!("    reclaim_terminal: {}", cfg.engine.reclaim_terminal);
    println!("  driver:");
    println!("    step_delay_ms: {}", cfg.driver.step_delay_ms);
    println!("  script ({} steps):", steps.len());

    for (idx, step) in steps.iter().enumerate() {
        println!("    {:>3}: {:?}", idx + 1, step);
    }

    debug!("dry-run complete (no execution)");
}
