// src/events/mod.rs

//! Run events and the per-run event log.
//!
//! - [`event`] defines [`RunEvent`], the tagged union the optimizer driver
//!   emits and observers receive.
//! - [`log`] holds [`EventLog`], the append-only history replayed to late
//!   subscribers.

pub mod event;
pub mod log;

pub use event::{RunEvent, Timestamp};
pub use log::EventLog;
