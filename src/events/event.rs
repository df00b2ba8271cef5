// src/events/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LogLevel, RunStatus};

/// Wall-clock timestamp carried by every event.
pub type Timestamp = DateTime<Utc>;

/// A single, immutable record of run progress.
///
/// Serialized with a `kind` tag, e.g.
///
/// ```json
/// {"kind":"status","status":"running","timestamp":"2026-01-01T00:00:00Z"}
/// {"kind":"log","level":"info","message":"x","timestamp":"..."}
/// ```
///
/// The engine only interprets `status` events; everything else is ordered
/// and forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunEvent {
    /// Lifecycle change.
    Status {
        status: RunStatus,
        timestamp: Timestamp,
    },
    /// Free-text log line from the driver.
    Log {
        level: LogLevel,
        message: String,
        timestamp: Timestamp,
    },
    /// Opaque progress payload (iteration counters, candidate prompts, ...).
    Progress {
        payload: serde_json::Value,
        timestamp: Timestamp,
    },
    /// Named scalar metric, e.g. a score reported by the evaluation pipeline.
    Metric {
        name: String,
        value: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<u64>,
        timestamp: Timestamp,
    },
}

impl RunEvent {
    pub fn status(status: RunStatus) -> Self {
        RunEvent::Status {
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        RunEvent::Log {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn progress(payload: serde_json::Value) -> Self {
        RunEvent::Progress {
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn metric(name: impl Into<String>, value: f64, step: Option<u64>) -> Self {
        RunEvent::Metric {
            name: name.into(),
            value,
            step,
            timestamp: Utc::now(),
        }
    }

    /// The `kind` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            RunEvent::Status { .. } => "status",
            RunEvent::Log { .. } => "log",
            RunEvent::Progress { .. } => "progress",
            RunEvent::Metric { .. } => "metric",
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            RunEvent::Status { timestamp, .. }
            | RunEvent::Log { timestamp, .. }
            | RunEvent::Progress { timestamp, .. }
            | RunEvent::Metric { timestamp, .. } => *timestamp,
        }
    }

    /// The carried status, if this is a `status` event.
    pub fn as_status(&self) -> Option<RunStatus> {
        match self {
            RunEvent::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
