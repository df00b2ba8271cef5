// src/config/mod.rs

//! Configuration loading and validation for runhub.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate the tuning knobs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, DriverSection, EngineConfig, EngineSection, RawConfigFile};
pub use validate::validate_config;
