// src/engine/subscription.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;

use crate::engine::registry::SubscriberId;
use crate::engine::runtime::{EngineInner, RunEngine};
use crate::events::RunEvent;
use crate::types::RunId;

/// Handle that detaches one subscriber from its run.
///
/// Idempotent and cheap to clone; all clones share the same state, so the
/// subscriber is removed at most once. Safe to call after the run (or the
/// whole engine) is gone.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    engine: Weak<EngineInner>,
    run_id: RunId,
    subscriber: SubscriberId,
    done: Arc<AtomicBool>,
}

impl Unsubscribe {
    pub(crate) fn new(engine: Weak<EngineInner>, run_id: RunId, subscriber: SubscriberId) -> Self {
        Self {
            engine,
            run_id,
            subscriber,
            done: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Remove the subscriber. Second and later calls are no-ops.
    pub fn unsubscribe(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(inner) = self.engine.upgrade() {
            RunEngine::from_inner(inner).detach(self.run_id, self.subscriber);
        }
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// A subscriber's ordered feed of one run.
///
/// Starts with the replayed history, then live events. Dropping the
/// subscription unsubscribes it.
///
/// After [`unsubscribe`](Self::unsubscribe) the feed reports end-of-stream
/// even if events were still queued.
#[derive(Debug)]
pub struct Subscription {
    run_id: RunId,
    rx: mpsc::UnboundedReceiver<RunEvent>,
    unsubscribe: Unsubscribe,
}

impl Subscription {
    pub(crate) fn new(
        run_id: RunId,
        rx: mpsc::UnboundedReceiver<RunEvent>,
        unsubscribe: Unsubscribe,
    ) -> Self {
        Self {
            run_id,
            rx,
            unsubscribe,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Next event, waiting if none is queued.
    ///
    /// Returns `None` once unsubscribed, or once the run was reclaimed and
    /// the queue is drained.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        if self.unsubscribe.is_unsubscribed() {
            return None;
        }
        self.rx.recv().await
    }

    /// Next already-queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<RunEvent> {
        if self.unsubscribe.is_unsubscribed() {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Every event currently queued, oldest first.
    pub fn drain_buffered(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// A detached handle that can unsubscribe from elsewhere.
    pub fn unsubscriber(&self) -> Unsubscribe {
        self.unsubscribe.clone()
    }

    pub fn unsubscribe(&self) {
        self.unsubscribe.unsubscribe();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
    }
}
