#![allow(dead_code)]

pub use runhub_test_utils::builders;
pub use runhub_test_utils::{collect_until_terminal, drain, init_tracing, with_timeout};

use runhub::config::EngineConfig;
use runhub::{ProjectId, RunEngine};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn engine() -> RunEngine {
    RunEngine::new(EngineConfig::default())
}

pub fn project(id: &str) -> ProjectId {
    ProjectId::new(id)
}
