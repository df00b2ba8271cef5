use std::sync::{Arc, Mutex};

use runhub::driver::{DriverLaunch, RunDriver};
use runhub::{RunEvent, RunId};

/// A fake driver that:
/// - records every launch (run id + opaque config)
/// - optionally ingests a fixed list of events synchronously on launch.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    launched: Arc<Mutex<Vec<(RunId, serde_json::Value)>>>,
    on_launch: Vec<RunEvent>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest `events` into each run as soon as it is launched.
    pub fn emitting(events: Vec<RunEvent>) -> Self {
        Self {
            launched: Arc::default(),
            on_launch: events,
        }
    }

    pub fn launched(&self) -> Vec<(RunId, serde_json::Value)> {
        self.launched.lock().unwrap().clone()
    }
}

impl RunDriver for RecordingDriver {
    fn launch(&self, launch: DriverLaunch) {
        {
            let mut guard = self.launched.lock().unwrap();
            guard.push((launch.run_id, launch.config.clone()));
        }

        for event in &self.on_launch {
            launch.engine.ingest(launch.run_id, event.clone());
        }
    }
}
