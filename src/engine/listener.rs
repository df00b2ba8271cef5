// src/engine/listener.rs

//! Callback-style observers.
//!
//! A [`RunListener`] is driven by a dedicated worker task reading from its
//! own [`Subscription`]:
//!
//! ```text
//! RunEngine ──► [queue] ──► worker task ──► listener.on_event()
//!                                    ├─► panic caught → logged, next event
//!                                    └─► is_closed() → listener detached
//! ```
//!
//! A slow listener only grows its own queue. A panic inside `on_event` is
//! logged and the worker moves on to the next event; the listener is only
//! detached once it reports itself closed.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::runtime::RunEngine;
use crate::engine::subscription::{Subscription, Unsubscribe};
use crate::errors::{Result, RunhubError};
use crate::events::RunEvent;
use crate::types::RunId;

/// Receives the events of one run, history first.
pub trait RunListener: Send + Sync + 'static {
    fn on_event(&self, event: &RunEvent);

    /// True once the listener can no longer take events (its client went
    /// away). The worker then unsubscribes it.
    fn is_closed(&self) -> bool {
        false
    }

    /// Name used in logs.
    fn name(&self) -> &str {
        "listener"
    }
}

impl<F> RunListener for F
where
    F: Fn(&RunEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &RunEvent) {
        self(event)
    }
}

/// Handle to a running listener worker.
#[derive(Debug)]
pub struct ListenerHandle {
    unsubscribe: Unsubscribe,
    worker: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn unsubscriber(&self) -> Unsubscribe {
        self.unsubscribe.clone()
    }

    /// Stop delivery. Events already handed to `on_event` are not recalled.
    pub fn unsubscribe(&self) {
        self.unsubscribe.unsubscribe();
    }

    /// Wait for the worker to finish (after unsubscribe, reclamation or the
    /// listener closing).
    pub async fn join(self) {
        if let Err(e) = self.worker.await {
            debug!(error = %e, "listener worker join failed");
        }
    }
}

impl RunEngine {
    /// Subscribe `listener` to `run_id` and drive it from a worker task.
    ///
    /// Fails with [`RunhubError::RuntimeUnavailable`] outside a Tokio
    /// runtime; the run is left untouched in that case.
    pub fn subscribe_listener(
        &self,
        run_id: RunId,
        listener: Arc<dyn RunListener>,
    ) -> Result<ListenerHandle> {
        let runtime = Handle::try_current()
            .map_err(|e| RunhubError::RuntimeUnavailable(e.to_string()))?;

        let subscription = self.subscribe(run_id)?;
        let unsubscribe = subscription.unsubscriber();
        let worker = runtime.spawn(drive_listener(subscription, listener));

        Ok(ListenerHandle {
            unsubscribe,
            worker,
        })
    }
}

async fn drive_listener(mut subscription: Subscription, listener: Arc<dyn RunListener>) {
    let run_id = subscription.run_id();

    while let Some(event) = subscription.recv().await {
        if listener.is_closed() {
            debug!(%run_id, listener = listener.name(), "listener closed; detaching");
            break;
        }

        let delivered = catch_unwind(AssertUnwindSafe(|| listener.on_event(&event)));

        if delivered.is_err() {
            warn!(
                %run_id,
                listener = listener.name(),
                kind = event.kind(),
                "listener panicked on event; continuing"
            );
        }
    }

    debug!(%run_id, listener = listener.name(), "listener worker finished");
    // Dropping the subscription unsubscribes.
}
