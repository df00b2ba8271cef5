// src/driver/mod.rs

//! The producer side of a run.
//!
//! - [`backend`] provides the `RunDriver` trait the engine calls on `start`.
//! - [`script`] contains `ScriptedDriver`, which replays a JSON-lines script
//!   and is what the `runhub` binary uses.

pub mod backend;
pub mod script;

pub use backend::{DriverLaunch, RunDriver};
pub use script::{DriverStep, ScriptedDriver, load_script, parse_script};
