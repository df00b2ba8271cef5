// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RunhubError};

/// Smallest history cap that still holds the initial `starting` event plus
/// one later event.
pub const MIN_HISTORY_LIMIT: usize = 2;

/// Upper bound on the scripted driver's step delay (one hour).
pub const MAX_STEP_DELAY_MS: u64 = 3_600_000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunhubError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.driver))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_driver(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if let Some(limit) = cfg.engine.history_limit {
        if limit < MIN_HISTORY_LIMIT {
            return Err(RunhubError::ConfigError(format!(
                "[engine].history_limit must be >= {MIN_HISTORY_LIMIT} (got {limit})"
            )));
        }
    }
    Ok(())
}

fn validate_driver(cfg: &RawConfigFile) -> Result<()> {
    if cfg.driver.step_delay_ms > MAX_STEP_DELAY_MS {
        return Err(RunhubError::ConfigError(format!(
            "[driver].step_delay_ms must be <= {MAX_STEP_DELAY_MS} (got {})",
            cfg.driver.step_delay_ms
        )));
    }
    Ok(())
}
