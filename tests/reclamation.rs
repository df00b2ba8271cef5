// tests/reclamation.rs

mod common;
use crate::common::{TestResult, drain, engine, init_tracing, project};

use serde_json::json;

use runhub::config::EngineConfig;
use runhub::{IngestOutcome, LogLevel, RunEngine, RunEvent, RunStatus};

#[test]
fn abort_then_last_unsubscribe_removes_run() -> TestResult {
    init_tracing();
    let engine = engine();
    let p = project("p");
    let run = engine.start(p.clone(), json!({}));
    let sub = engine.subscribe(run)?;

    assert!(engine.abort(run));
    assert_eq!(engine.list_by_project(&p).len(), 1, "still observed");

    sub.unsubscribe();
    assert!(engine.list_by_project(&p).is_empty());
    assert_eq!(engine.run_count(), 0);

    Ok(())
}

#[test]
fn completed_run_without_subscribers_is_reclaimed_immediately() {
    init_tracing();
    let engine = engine();
    let p = project("p");
    let run = engine.start(p.clone(), json!({}));

    engine.ingest(run, RunEvent::status(RunStatus::Running));
    engine.ingest(run, RunEvent::status(RunStatus::Completed));

    assert!(engine.list_by_project(&p).is_empty());
    assert_eq!(
        engine.ingest(run, RunEvent::log(LogLevel::Info, "late")),
        IngestOutcome::UnknownRun
    );
    assert!(engine.subscribe(run).is_err());
}

#[test]
fn last_unsubscribe_after_error_reclaims_run() -> TestResult {
    let engine = engine();
    let run = engine.start("p", json!({}));
    let mut a = engine.subscribe(run)?;
    let b = engine.subscribe(run)?;

    engine.ingest(run, RunEvent::status(RunStatus::Error));
    drop(b);
    let events = drain(&mut a);
    assert_eq!(events.len(), 2);
    a.unsubscribe();

    assert_eq!(engine.status(run), None);
    assert!(a.try_recv().is_none());

    Ok(())
}

#[test]
fn non_terminal_run_without_subscribers_is_kept() -> TestResult {
    let engine = engine();
    let p = project("p");
    let run = engine.start(p.clone(), json!({}));
    drop(engine.subscribe(run)?);

    engine.ingest(run, RunEvent::status(RunStatus::Running));
    engine.ingest(run, RunEvent::status(RunStatus::Paused));

    let listed = engine.list_by_project(&p);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, RunStatus::Paused);

    Ok(())
}

#[test]
fn reclamation_can_be_disabled() {
    init_tracing();
    let engine = RunEngine::new(EngineConfig {
        history_limit: None,
        reclaim_terminal: false,
    });
    assert!(!engine.config().reclaim_terminal);
    let p = project("p");
    let run = engine.start(p.clone(), json!({}));

    assert!(engine.abort(run));

    let listed = engine.list_by_project(&p);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, RunStatus::Aborted);
    assert!(!engine.abort(run));
}

#[test]
fn projects_are_independent_under_reclamation() {
    let engine = engine();
    let p1 = project("p1");
    let p2 = project("p2");
    let a = engine.start(p1.clone(), json!({}));
    let b = engine.start(p2.clone(), json!({}));

    assert!(engine.abort(a));

    assert!(engine.list_by_project(&p1).is_empty());
    let left: Vec<_> = engine.list_by_project(&p2).into_iter().map(|s| s.run_id).collect();
    assert_eq!(left, vec![b]);
}

#[test]
fn history_limit_evicts_oldest_events() -> TestResult {
    init_tracing();
    let engine = RunEngine::new(EngineConfig {
        history_limit: Some(3),
        reclaim_terminal: true,
    });
    let run = engine.start("p", json!({}));
    for i in 0..5 {
        engine.ingest(run, RunEvent::log(LogLevel::Info, format!("line {i}")));
    }

    let mut sub = engine.subscribe(run)?;
    let replayed = drain(&mut sub);
    let messages: Vec<String> = replayed
        .iter()
        .filter_map(|e| match e {
            RunEvent::Log { message, .. } => Some(message.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    assert_eq!(engine.summary(run).map(|s| s.event_count), Some(3));

    Ok(())
}
