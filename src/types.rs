// src/types.rs

//! Identifiers and small enums shared across the engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque run identifier, generated at `start` and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Allocate a fresh identifier.
    pub fn new() -> Self {
        RunId(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(RunId)
    }
}

/// Caller-supplied grouping key. Many runs may share one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Self {
        ProjectId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        ProjectId(s)
    }
}

/// Lifecycle status of a run.
///
/// ```text
/// starting -> running -> paused -> running
/// starting -> paused
/// paused -> starting                       (resume only)
/// starting|running|paused -> aborted|completed|error
/// ```
///
/// `aborted`, `completed` and `error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Starting,
    Running,
    Paused,
    Aborted,
    Completed,
    Error,
}

impl RunStatus {
    /// Returns true for statuses with no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Aborted | RunStatus::Completed | RunStatus::Error)
    }

    /// Whether a status event moving `self` to `next` is a legal transition.
    ///
    /// Re-announcing the current (non-terminal) status is accepted.
    /// `paused -> starting` is not: only `RunEngine::resume` takes it.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;

        if self.is_terminal() {
            return false;
        }
        if self == next || next.is_terminal() {
            return true;
        }

        matches!(
            (self, next),
            (Starting, Running)
                | (Starting, Paused)
                | (Running, Paused)
                | (Paused, Running)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Starting => "starting",
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::Aborted => "aborted",
            RunStatus::Completed => "completed",
            RunStatus::Error => "error",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "starting" => Ok(RunStatus::Starting),
            "running" => Ok(RunStatus::Running),
            "paused" => Ok(RunStatus::Paused),
            "aborted" => Ok(RunStatus::Aborted),
            "completed" => Ok(RunStatus::Completed),
            "error" => Ok(RunStatus::Error),
            other => Err(format!("invalid run status: {other}")),
        }
    }
}

/// Severity of a `log` run event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}
