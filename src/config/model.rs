// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// history_limit = 10000
/// reclaim_terminal = true
///
/// [driver]
/// step_delay_ms = 250
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub driver: DriverSection,
}

/// Validated configuration. Build one with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub driver: DriverSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, driver: DriverSection) -> Self {
        Self { engine, driver }
    }

    /// Runtime view of `[engine]` handed to `RunEngine::new`.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            history_limit: self.engine.history_limit,
            reclaim_terminal: self.engine.reclaim_terminal,
        }
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.driver.step_delay_ms)
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Maximum number of events retained per run. Unbounded when absent.
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Drop runs that are terminal and have no subscribers.
    #[serde(default = "default_reclaim_terminal")]
    pub reclaim_terminal: bool,
}

fn default_reclaim_terminal() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            history_limit: None,
            reclaim_terminal: default_reclaim_terminal(),
        }
    }
}

/// `[driver]` section, used by the scripted driver of the binary.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DriverSection {
    /// Delay inserted between two script steps.
    #[serde(default)]
    pub step_delay_ms: u64,
}

/// Engine tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub history_limit: Option<usize>,
    pub reclaim_terminal: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            reclaim_terminal: true,
        }
    }
}
