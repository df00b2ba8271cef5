// src/events/log.rs

use std::collections::VecDeque;

use tracing::debug;

use super::RunEvent;

/// Append-only, ordered history of one run.
///
/// Unbounded unless constructed with a `limit`; when the limit is reached
/// the oldest event is evicted so replay starts at the oldest retained one.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: VecDeque<RunEvent>,
    limit: Option<usize>,
    /// Total number of events ever appended, including evicted ones.
    appended: u64,
}

impl EventLog {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            events: VecDeque::new(),
            limit: limit.map(|l| l.max(1)),
            appended: 0,
        }
    }

    pub fn append(&mut self, event: RunEvent) {
        if let Some(limit) = self.limit {
            while self.events.len() >= limit {
                self.events.pop_front();
                debug!(limit, "event log full; evicted oldest event");
            }
        }
        self.events.push_back(event);
        self.appended += 1;
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_appended(&self) -> u64 {
        self.appended
    }

    pub fn last(&self) -> Option<&RunEvent> {
        self.events.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunEvent> {
        self.events.iter()
    }
}
