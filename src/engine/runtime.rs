// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::driver::{DriverLaunch, RunDriver};
use crate::engine::record::{Applied, RunRecord, RunSummary};
use crate::engine::registry::SubscriberId;
use crate::engine::subscription::{Subscription, Unsubscribe};
use crate::errors::{Result, RunhubError};
use crate::events::RunEvent;
use crate::types::{ProjectId, RunId, RunStatus};

/// What happened to an ingested event.
///
/// Producers are free to ignore this; an unknown run is not an error for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Appended to the log and handed to `listeners` subscribers.
    Delivered { listeners: usize },
    /// No such run (never existed or already reclaimed).
    UnknownRun,
    /// A status event that is not a legal transition from the current status.
    Rejected { from: RunStatus, to: RunStatus },
}

type SharedRecord = Arc<Mutex<RunRecord>>;

/// Process-wide index of live runs.
#[derive(Default)]
struct RunTable {
    runs: HashMap<RunId, SharedRecord>,
    /// Insertion-ordered run ids per project.
    projects: HashMap<ProjectId, Vec<RunId>>,
}

pub(crate) struct EngineInner {
    config: EngineConfig,
    driver: Option<Arc<dyn RunDriver>>,
    table: Mutex<RunTable>,
}

/// In-memory broker for optimization runs.
///
/// Owns every [`RunRecord`] and exposes start / ingest / subscribe / abort /
/// resume / list. `RunEngine` is a cheap handle: clones share the same state.
///
/// Locking:
/// - `table` guards the run map and project index.
/// - each record has its own mutex; all mutations of one run are serialized
///   on it.
/// - the table lock is never acquired while a record lock is held.
///
/// Delivery happens under the record lock but only pushes into unbounded
/// queues, so producers never wait on observers and observers can call back
/// into the engine freely.
#[derive(Clone)]
pub struct RunEngine {
    inner: Arc<EngineInner>,
}

impl fmt::Debug for RunEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunEngine")
            .field("config", &self.inner.config)
            .field("runs", &self.run_count())
            .finish_non_exhaustive()
    }
}

impl Default for RunEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunEngine {
    /// Engine without a driver; events are fed through [`ingest`](Self::ingest).
    pub fn new(config: EngineConfig) -> Self {
        Self::build(config, None)
    }

    /// Engine that hands every started run to `driver`.
    pub fn with_driver(config: EngineConfig, driver: Arc<dyn RunDriver>) -> Self {
        Self::build(config, Some(driver))
    }

    fn build(config: EngineConfig, driver: Option<Arc<dyn RunDriver>>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                driver,
                table: Mutex::new(RunTable::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<EngineInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> std::sync::Weak<EngineInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Create a run in `starting` under `project` and launch the driver.
    ///
    /// `config` is opaque to the engine; it is stored with the run and
    /// forwarded to the driver untouched.
    pub fn start(&self, project: impl Into<ProjectId>, config: serde_json::Value) -> RunId {
        let project = project.into();
        let run_id = RunId::new();
        let record = RunRecord::new(
            run_id,
            project.clone(),
            config.clone(),
            self.inner.config.history_limit,
        );

        {
            let mut table = lock(&self.inner.table);
            table.runs.insert(run_id, Arc::new(Mutex::new(record)));
            table.projects.entry(project.clone()).or_default().push(run_id);
        }

        info!(%run_id, %project, "run started");

        if let Some(driver) = &self.inner.driver {
            driver.launch(DriverLaunch {
                run_id,
                project_id: project,
                config,
                engine: self.clone(),
            });
        }

        run_id
    }

    /// Append `event` to the run's log and push it to every subscriber.
    ///
    /// Unknown runs are a silent no-op; see [`IngestOutcome`].
    pub fn ingest(&self, run_id: RunId, event: RunEvent) -> IngestOutcome {
        let kind = event.kind();
        let outcome = self.with_record(run_id, |record| match record.apply(event) {
            Applied::Accepted { listeners } => IngestOutcome::Delivered { listeners },
            Applied::Rejected { from, to } => IngestOutcome::Rejected { from, to },
        });

        match outcome {
            Some(outcome) => {
                debug!(%run_id, kind, ?outcome, "event ingested");
                outcome
            }
            None => {
                debug!(%run_id, kind, "ingest for unknown run ignored");
                IngestOutcome::UnknownRun
            }
        }
    }

    /// Attach a new subscriber to `run_id`.
    ///
    /// The returned [`Subscription`] already holds the run's full history
    /// in order; everything ingested afterwards follows it. Fails with
    /// [`RunhubError::RunNotFound`] for unknown or reclaimed runs.
    pub fn subscribe(&self, run_id: RunId) -> Result<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();

        let subscriber = self
            .with_record(run_id, |record| record.attach(tx))
            .ok_or(RunhubError::RunNotFound(run_id))?;

        debug!(%run_id, subscriber, "subscribed");
        let unsubscribe = Unsubscribe::new(self.downgrade(), run_id, subscriber);
        Ok(Subscription::new(run_id, rx, unsubscribe))
    }

    /// Abort a non-terminal run. Returns false if the run is unknown or
    /// already terminal; in that case nothing is emitted.
    pub fn abort(&self, run_id: RunId) -> bool {
        let aborted = self
            .with_record(run_id, |record| {
                if record.status().is_terminal() {
                    return false;
                }
                matches!(
                    record.apply(RunEvent::status(RunStatus::Aborted)),
                    Applied::Accepted { .. }
                )
            })
            .unwrap_or(false);

        if aborted {
            info!(%run_id, "run aborted");
        } else {
            debug!(%run_id, "abort ignored");
        }
        aborted
    }

    /// Resume a paused run by re-entering `starting`.
    ///
    /// Returns false for unknown runs and for any status other than `paused`.
    pub fn resume(&self, run_id: RunId) -> bool {
        let resumed = self
            .with_record(run_id, |record| {
                matches!(record.resume(), Applied::Accepted { .. })
            })
            .unwrap_or(false);

        if resumed {
            info!(%run_id, "run resumed");
        } else {
            debug!(%run_id, "resume ignored");
        }
        resumed
    }

    /// Runs currently retained under `project`, in start order.
    pub fn list_by_project(&self, project: &ProjectId) -> Vec<RunSummary> {
        let records: Vec<SharedRecord> = {
            let table = lock(&self.inner.table);
            table
                .projects
                .get(project)
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| table.runs.get(id).cloned())
                        .collect()
                })
                .unwrap_or_default()
        };

        records
            .iter()
            .filter_map(|shared| {
                let record = lock(shared);
                (!record.is_reclaimed()).then(|| record.summary())
            })
            .collect()
    }

    pub fn status(&self, run_id: RunId) -> Option<RunStatus> {
        self.with_record(run_id, |record| record.status())
    }

    pub fn summary(&self, run_id: RunId) -> Option<RunSummary> {
        self.with_record(run_id, |record| record.summary())
    }

    /// Opaque config the run was started with.
    pub fn run_config(&self, run_id: RunId) -> Option<serde_json::Value> {
        self.with_record(run_id, |record| record.config().clone())
    }

    /// Observe status changes without subscribing to the event stream.
    ///
    /// Status watchers do not count as subscribers and never keep a run alive.
    pub fn watch_status(&self, run_id: RunId) -> Option<watch::Receiver<RunStatus>> {
        self.with_record(run_id, |record| record.watch_status())
    }

    /// Number of retained runs across all projects.
    pub fn run_count(&self) -> usize {
        lock(&self.inner.table).runs.len()
    }

    /// Remove subscriber `id` from `run_id`. Safe on reclaimed runs.
    pub(crate) fn detach(&self, run_id: RunId, id: SubscriberId) {
        let removed = self.with_record(run_id, |record| record.detach(id));
        debug!(%run_id, subscriber = id, removed = removed.unwrap_or(false), "unsubscribed");
    }

    fn lookup(&self, run_id: RunId) -> Option<SharedRecord> {
        lock(&self.inner.table).runs.get(&run_id).cloned()
    }

    /// Run `f` on a live record under its lock, then reclaim the record if
    /// `f` left it terminal and unobserved.
    ///
    /// The reclaim decision is taken under the same lock as `f`, so a
    /// concurrent `subscribe` either attaches first (and keeps the run) or
    /// sees the record as reclaimed.
    fn with_record<R>(&self, run_id: RunId, f: impl FnOnce(&mut RunRecord) -> R) -> Option<R> {
        let shared = self.lookup(run_id)?;

        let (result, reclaim) = {
            let mut record = lock(&shared);
            if record.is_reclaimed() {
                return None;
            }
            let result = f(&mut record);
            let reclaim = self.inner.config.reclaim_terminal
                && record.is_reclaimable()
                && record.mark_reclaimed();
            (result, reclaim.then(|| record.project_id().clone()))
        };

        if let Some(project) = reclaim {
            self.remove(run_id, &project);
        }

        Some(result)
    }

    fn remove(&self, run_id: RunId, project: &ProjectId) {
        let mut table = lock(&self.inner.table);
        table.runs.remove(&run_id);

        if let Some(ids) = table.projects.get_mut(project) {
            ids.retain(|id| *id != run_id);
            if ids.is_empty() {
                table.projects.remove(project);
            }
        }

        info!(%run_id, %project, remaining = table.runs.len(), "run reclaimed");
    }
}
