// src/engine/mod.rs

//! The run engine.
//!
//! This module ties together:
//! - the per-run aggregate ([`record`]): status machine, event log, subscribers
//! - subscriber fan-out ([`registry`])
//! - the process-wide broker ([`runtime`]) that owns every record, indexes
//!   runs by project and reclaims finished, unobserved runs
//! - consumer-side handles ([`subscription`]) and callback adapters
//!   ([`listener`])

pub mod listener;
pub mod record;
pub mod registry;
pub mod runtime;
pub mod subscription;

pub use listener::{ListenerHandle, RunListener};
pub use record::{Applied, RunRecord, RunSummary};
pub use registry::{SubscriberId, SubscriberRegistry};
pub use runtime::{IngestOutcome, RunEngine};
pub use subscription::{Subscription, Unsubscribe};
