// src/driver/script.rs

//! Driver that replays a JSON-lines script into a run.
//!
//! One step per line; blank lines and lines starting with `#` are skipped:
//!
//! ```text
//! {"kind":"status","status":"running"}
//! {"kind":"log","level":"info","message":"evaluating candidate 1"}
//! {"kind":"metric","name":"score","value":0.62,"step":1}
//! {"kind":"progress","payload":{"iteration":1}}
//! {"kind":"sleep","ms":200}
//! {"kind":"status","status":"completed"}
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::driver::backend::{DriverLaunch, RunDriver};
use crate::engine::{IngestOutcome, RunEngine};
use crate::errors::{Result, RunhubError};
use crate::events::RunEvent;
use crate::types::{LogLevel, RunId, RunStatus};

/// One line of a driver script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverStep {
    Status {
        status: RunStatus,
    },
    Log {
        #[serde(default)]
        level: LogLevel,
        message: String,
    },
    Progress {
        payload: serde_json::Value,
    },
    Metric {
        name: String,
        value: f64,
        #[serde(default)]
        step: Option<u64>,
    },
    /// Wait before the next step; emits nothing.
    Sleep {
        ms: u64,
    },
}

impl DriverStep {
    /// The event this step produces, stamped with the current time.
    pub fn to_event(&self) -> Option<RunEvent> {
        match self {
            DriverStep::Status { status } => Some(RunEvent::status(*status)),
            DriverStep::Log { level, message } => Some(RunEvent::log(*level, message.clone())),
            DriverStep::Progress { payload } => Some(RunEvent::progress(payload.clone())),
            DriverStep::Metric { name, value, step } => {
                Some(RunEvent::metric(name.clone(), *value, *step))
            }
            DriverStep::Sleep { .. } => None,
        }
    }
}

/// Parse a script. Errors name the offending (1-based) line.
pub fn parse_script(text: &str) -> Result<Vec<DriverStep>> {
    let mut steps = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: DriverStep = serde_json::from_str(line).map_err(|e| {
            RunhubError::ConfigError(format!("script line {}: {e}", idx + 1))
        })?;
        steps.push(step);
    }

    Ok(steps)
}

pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<DriverStep>> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_script(&contents)
}

/// Replays a fixed list of steps into every run it launches.
///
/// - Stops as soon as the run is terminal or no longer known (abort).
/// - While the run is `paused`, waits until it is resumed or ended.
/// - If the script ends without a terminal status, reports `completed`.
#[derive(Debug, Clone)]
pub struct ScriptedDriver {
    steps: Vec<DriverStep>,
    step_delay: Duration,
}

impl ScriptedDriver {
    pub fn new(steps: Vec<DriverStep>, step_delay: Duration) -> Self {
        Self { steps, step_delay }
    }
}

impl RunDriver for ScriptedDriver {
    fn launch(&self, launch: DriverLaunch) {
        let run_id = launch.run_id;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(replay(
                    self.steps.clone(),
                    self.step_delay,
                    launch.engine,
                    run_id,
                ));
            }
            Err(e) => {
                warn!(%run_id, error = %e, "no tokio runtime; cannot drive run");
                launch.engine.ingest(
                    run_id,
                    RunEvent::log(LogLevel::Error, format!("driver unavailable: {e}")),
                );
                launch.engine.ingest(run_id, RunEvent::status(RunStatus::Error));
            }
        }
    }
}

async fn replay(steps: Vec<DriverStep>, delay: Duration, engine: RunEngine, run_id: RunId) {
    let Some(mut status_rx) = engine.watch_status(run_id) else {
        debug!(%run_id, "run vanished before driver started");
        return;
    };

    info!(%run_id, steps = steps.len(), "scripted driver started");

    for step in &steps {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if !wait_while_paused(&mut status_rx).await {
            info!(%run_id, "run ended; scripted driver stopping");
            return;
        }

        let Some(event) = step.to_event() else {
            if let DriverStep::Sleep { ms } = step {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            continue;
        };

        match engine.ingest(run_id, event) {
            IngestOutcome::UnknownRun => {
                debug!(%run_id, "run reclaimed; scripted driver stopping");
                return;
            }
            IngestOutcome::Rejected { from, to } => {
                warn!(%run_id, %from, %to, "script step rejected by engine");
            }
            IngestOutcome::Delivered { .. } => {}
        }
    }

    let ended = engine.status(run_id).is_none_or(RunStatus::is_terminal);
    if !ended {
        debug!(%run_id, "script exhausted; marking run completed");
        engine.ingest(run_id, RunEvent::status(RunStatus::Completed));
    }

    info!(%run_id, "scripted driver finished");
}

/// Block while the run is paused. Returns false once it is terminal or gone.
async fn wait_while_paused(status_rx: &mut watch::Receiver<RunStatus>) -> bool {
    loop {
        let status = *status_rx.borrow_and_update();
        if status.is_terminal() {
            return false;
        }
        if status != RunStatus::Paused {
            return true;
        }
        if status_rx.changed().await.is_err() {
            return false;
        }
    }
}
