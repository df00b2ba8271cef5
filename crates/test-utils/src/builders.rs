#![allow(dead_code)]

use runhub::{LogLevel, RunEvent, RunStatus};

/// Builder for a sequence of run events, as a driver would emit them.
#[derive(Debug, Default, Clone)]
pub struct EventSeqBuilder {
    events: Vec<RunEvent>,
}

impl EventSeqBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: RunStatus) -> Self {
        self.events.push(RunEvent::status(status));
        self
    }

    pub fn info(mut self, message: &str) -> Self {
        self.events.push(RunEvent::log(LogLevel::Info, message));
        self
    }

    pub fn log(mut self, level: LogLevel, message: &str) -> Self {
        self.events.push(RunEvent::log(level, message));
        self
    }

    pub fn metric(mut self, name: &str, value: f64, step: u64) -> Self {
        self.events.push(RunEvent::metric(name, value, Some(step)));
        self
    }

    pub fn progress(mut self, payload: serde_json::Value) -> Self {
        self.events.push(RunEvent::progress(payload));
        self
    }

    pub fn build(self) -> Vec<RunEvent> {
        self.events
    }
}

/// Statuses carried by `events`, in order, skipping non-status events.
pub fn statuses(events: &[RunEvent]) -> Vec<RunStatus> {
    events.iter().filter_map(RunEvent::as_status).collect()
}

/// `kind` tags of `events`, in order.
pub fn kinds(events: &[RunEvent]) -> Vec<&'static str> {
    events.iter().map(RunEvent::kind).collect()
}
