// src/engine/record.rs

//! The per-run aggregate.
//!
//! A [`RunRecord`] owns a run's status, its event log and its subscribers.
//! It knows nothing about locking or the project index; the
//! [`RunEngine`](super::RunEngine) wraps each record in its own mutex and
//! calls into it. All transition rules live here so they can be exercised
//! without a runtime.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::engine::registry::{SubscriberId, SubscriberRegistry};
use crate::events::{EventLog, RunEvent, Timestamp};
use crate::types::{ProjectId, RunId, RunStatus};

/// Result of feeding one event into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Appended and handed to `listeners` subscribers.
    Accepted { listeners: usize },
    /// Status event not permitted from the current status; nothing changed.
    Rejected { from: RunStatus, to: RunStatus },
}

/// Point-in-time view of a run, as rendered by dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub project_id: ProjectId,
    pub status: RunStatus,
    pub event_count: usize,
    pub subscribers: usize,
    pub started_at: Timestamp,
}

#[derive(Debug)]
pub struct RunRecord {
    run_id: RunId,
    project_id: ProjectId,
    status: RunStatus,
    started_at: Timestamp,
    config: serde_json::Value,
    log: EventLog,
    subscribers: SubscriberRegistry,
    status_tx: watch::Sender<RunStatus>,
    /// Set once the engine has decided to drop this record. A reclaimed
    /// record accepts nothing and behaves like an unknown run.
    reclaimed: bool,
}

impl RunRecord {
    /// Create a record in `starting` with the initial status event logged.
    pub fn new(
        run_id: RunId,
        project_id: ProjectId,
        config: serde_json::Value,
        history_limit: Option<usize>,
    ) -> Self {
        let started_at = Utc::now();
        let mut log = EventLog::new(history_limit);
        log.append(RunEvent::Status {
            status: RunStatus::Starting,
            timestamp: started_at,
        });
        let (status_tx, _) = watch::channel(RunStatus::Starting);

        Self {
            run_id,
            project_id,
            status: RunStatus::Starting,
            started_at,
            config,
            log,
            subscribers: SubscriberRegistry::new(),
            status_tx,
            reclaimed: false,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn config(&self) -> &serde_json::Value {
        &self.config
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_reclaimed(&self) -> bool {
        self.reclaimed
    }

    /// Receiver that observes every status change of this run.
    pub fn watch_status(&self) -> watch::Receiver<RunStatus> {
        self.status_tx.subscribe()
    }

    /// Append `event` and deliver it to every subscriber.
    ///
    /// Status events are checked against [`RunStatus::can_transition_to`].
    /// Once terminal, non-status events (trailing logs, final metrics) are
    /// still accepted but the status never changes again.
    pub fn apply(&mut self, event: RunEvent) -> Applied {
        if let Some(next) = event.as_status() {
            if !self.status.can_transition_to(next) {
                warn!(
                    run_id = %self.run_id,
                    from = %self.status,
                    to = %next,
                    "rejected status transition"
                );
                return Applied::Rejected {
                    from: self.status,
                    to: next,
                };
            }
        }

        self.commit(event)
    }

    /// Re-enter `starting` from `paused`.
    ///
    /// This is the only way back into `starting`; producers cannot take it.
    pub fn resume(&mut self) -> Applied {
        if self.status != RunStatus::Paused {
            return Applied::Rejected {
                from: self.status,
                to: RunStatus::Starting,
            };
        }
        self.commit(RunEvent::status(RunStatus::Starting))
    }

    fn commit(&mut self, event: RunEvent) -> Applied {
        if let Some(next) = event.as_status() {
            if next != self.status {
                debug!(run_id = %self.run_id, from = %self.status, to = %next, "status changed");
                self.status = next;
                self.status_tx.send_replace(next);
            }
        }

        let listeners = self.subscribers.broadcast(&event);
        self.log.append(event);

        Applied::Accepted { listeners }
    }

    /// Replay the full log into `sender` and register it for live events.
    pub fn attach(&mut self, sender: mpsc::UnboundedSender<RunEvent>) -> SubscriberId {
        self.subscribers.add(sender, self.log.iter())
    }

    pub fn detach(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id)
    }

    /// True when the record is terminal and nobody is observing it.
    pub fn is_reclaimable(&self) -> bool {
        !self.reclaimed && self.status.is_terminal() && self.subscribers.is_empty()
    }

    /// Mark the record as dropped. Returns false if it already was.
    pub fn mark_reclaimed(&mut self) -> bool {
        if self.reclaimed {
            return false;
        }
        self.reclaimed = true;
        self.subscribers.clear();
        true
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            project_id: self.project_id.clone(),
            status: self.status,
            event_count: self.log.len(),
            subscribers: self.subscribers.len(),
            started_at: self.started_at,
        }
    }
}
