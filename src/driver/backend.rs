// src/driver/backend.rs

//! Pluggable driver abstraction.
//!
//! The engine hands each started run to a `RunDriver` instead of running
//! the optimizer itself. Production code plugs in the real optimizer; the
//! binary uses [`ScriptedDriver`](super::ScriptedDriver); tests can record
//! launches and ingest events by hand.

use crate::engine::RunEngine;
use crate::types::{ProjectId, RunId};

/// Everything a driver needs to feed one run.
#[derive(Debug, Clone)]
pub struct DriverLaunch {
    pub run_id: RunId,
    pub project_id: ProjectId,
    /// Opaque payload passed to `RunEngine::start`.
    pub config: serde_json::Value,
    /// Handle used to `ingest` events and observe aborts.
    pub engine: RunEngine,
}

/// External process that produces a run's events.
pub trait RunDriver: Send + Sync {
    /// Begin producing events for a freshly started run.
    ///
    /// Called once per run, after the `starting` event is logged and
    /// outside every engine lock. Implementations should return quickly and
    /// do their work on their own task or thread.
    fn launch(&self, launch: DriverLaunch);
}
