// src/engine/registry.rs

//! Per-run fan-out to subscribers.
//!
//! Every subscriber owns an unbounded queue; the registry only holds the
//! sending halves.
//!
//! ```text
//! broadcast(event)
//!     ├──► [queue 1] ──► Subscription::recv()   (request task)
//!     ├──► [queue 2] ──► listener worker ──► on_event()
//!     └──► [queue N] ──► ...
//! ```
//!
//! - Sending never blocks and never runs subscriber code, so it is safe to do
//!   while the run's lock is held.
//! - Each queue is FIFO and fed in ingestion order.
//! - A queue whose receiver is gone is pruned on the next broadcast.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::events::RunEvent;

/// Identifies one subscription within a run.
pub type SubscriberId = u64;

struct SubscriberSlot {
    id: SubscriberId,
    sender: mpsc::UnboundedSender<RunEvent>,
}

#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: SubscriberId,
    slots: Vec<SubscriberSlot>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &self.slots.len())
            .finish()
    }
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `sender` with `history`, then register it for live delivery.
    ///
    /// Callers must hold the run's lock across this call so no event can be
    /// ingested between the replay and the registration.
    pub fn add<'a>(
        &mut self,
        sender: mpsc::UnboundedSender<RunEvent>,
        history: impl IntoIterator<Item = &'a RunEvent>,
    ) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;

        let mut replayed = 0usize;
        for event in history {
            if sender.send(event.clone()).is_err() {
                // Receiver already gone; nothing to register.
                debug!(subscriber = id, "receiver dropped during replay");
                return id;
            }
            replayed += 1;
        }

        debug!(subscriber = id, replayed, "subscriber attached");
        self.slots.push(SubscriberSlot { id, sender });
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        before != self.slots.len()
    }

    /// Push `event` to every subscriber, pruning closed queues.
    ///
    /// Returns the number of subscribers the event was handed to.
    pub fn broadcast(&mut self, event: &RunEvent) -> usize {
        let mut delivered = 0usize;

        self.slots.retain(|slot| match slot.sender.send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => {
                warn!(subscriber = slot.id, "subscriber queue closed; detaching");
                false
            }
        });

        delivered
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every sender, closing all subscriber queues.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
