// tests/subscriber_delivery.rs

mod common;
use crate::common::builders::{EventSeqBuilder, statuses};
use crate::common::{TestResult, drain, engine, init_tracing};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use serde_json::json;
use tokio::sync::mpsc;

use runhub::engine::SubscriberRegistry;
use runhub::{IngestOutcome, LogLevel, RunEvent, RunStatus};

#[test]
fn late_subscriber_sees_same_history_as_early_one() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    let mut early = engine.subscribe(run)?;

    let script = EventSeqBuilder::new()
        .status(RunStatus::Running)
        .info("loading dataset")
        .metric("score", 0.4, 1)
        .progress(json!({ "iteration": 1 }))
        .metric("score", 0.55, 2)
        .build();
    for event in script {
        engine.ingest(run, event);
    }

    let mut late = engine.subscribe(run)?;

    let early_events = drain(&mut early);
    let late_events = drain(&mut late);
    assert_eq!(early_events.len(), 6);
    assert_eq!(early_events, late_events);
    assert_eq!(statuses(&late_events)[0], RunStatus::Starting);

    Ok(())
}

#[test]
fn events_arrive_in_ingestion_order_for_every_subscriber() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    let mut subs = vec![engine.subscribe(run)?, engine.subscribe(run)?, engine.subscribe(run)?];

    let e1 = RunEvent::log(LogLevel::Info, "e1");
    let e2 = RunEvent::log(LogLevel::Info, "e2");
    assert_eq!(
        engine.ingest(run, e1.clone()),
        IngestOutcome::Delivered { listeners: 3 }
    );
    engine.ingest(run, e2.clone());

    for sub in subs.iter_mut() {
        let events = drain(sub);
        assert_eq!(&events[1..], &[e1.clone(), e2.clone()]);
    }

    Ok(())
}

#[test]
fn unsubscribed_listener_receives_nothing_more() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    let mut kept = engine.subscribe(run)?;
    let mut gone = engine.subscribe(run)?;

    engine.ingest(run, RunEvent::log(LogLevel::Info, "before"));
    gone.unsubscribe();
    engine.ingest(run, RunEvent::log(LogLevel::Info, "after"));

    assert!(gone.try_recv().is_none(), "feed ends once unsubscribed");
    assert_eq!(drain(&mut kept).len(), 3);

    let summary = engine.summary(run).ok_or("missing run")?;
    assert_eq!(summary.subscribers, 1);

    Ok(())
}

#[test]
fn unsubscribe_is_idempotent_and_safe_after_reclamation() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    let sub = engine.subscribe(run)?;
    let handle = sub.unsubscriber();
    let other = engine.subscribe(run)?;

    handle.unsubscribe();
    handle.unsubscribe();
    sub.unsubscribe();
    assert_eq!(engine.summary(run).map(|s| s.subscribers), Some(1));

    assert!(engine.abort(run));
    drop(other);
    assert_eq!(engine.status(run), None, "reclaimed after last subscriber left");

    // Still a no-op on a reclaimed run and after the engine is gone.
    handle.unsubscribe();
    drop(engine);
    handle.unsubscribe();
    drop(sub);

    Ok(())
}

#[test]
fn dropping_subscription_unsubscribes() -> TestResult {
    let engine = engine();
    let run = engine.start("p", json!({}));
    {
        let _sub = engine.subscribe(run)?;
        assert_eq!(engine.summary(run).map(|s| s.subscribers), Some(1));
    }
    assert_eq!(engine.summary(run).map(|s| s.subscribers), Some(0));

    Ok(())
}

#[test]
fn registry_detaches_closed_queues() {
    init_tracing();
    let mut registry = SubscriberRegistry::new();
    let (tx_live, mut rx_live) = mpsc::unbounded_channel();
    let (tx_dead, rx_dead) = mpsc::unbounded_channel();

    let history = [RunEvent::status(RunStatus::Starting)];
    registry.add(tx_live, history.iter());
    registry.add(tx_dead, history.iter());
    assert_eq!(registry.len(), 2);

    drop(rx_dead);
    let delivered = registry.broadcast(&RunEvent::log(LogLevel::Info, "hello"));

    assert_eq!(delivered, 1);
    assert_eq!(registry.len(), 1);
    assert!(rx_live.try_recv().is_ok(), "replayed starting event");
    assert!(rx_live.try_recv().is_ok(), "live log event");
}

#[test]
fn concurrent_subscribe_never_duplicates_or_drops() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    engine.ingest(run, RunEvent::status(RunStatus::Running));

    const EVENTS: u64 = 2_000;
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let engine = engine.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..EVENTS {
                engine.ingest(run, RunEvent::metric("step", i as f64, Some(i)));
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut subs = Vec::new();
    while !done.load(Ordering::Acquire) && subs.len() < 64 {
        subs.push(engine.subscribe(run)?);
        thread::yield_now();
    }
    producer.join().map_err(|_| "producer panicked")?;
    subs.push(engine.subscribe(run)?);

    let mut reference = engine.subscribe(run)?;
    let full = drain(&mut reference);
    assert_eq!(full.len() as u64, EVENTS + 2);

    for sub in subs.iter_mut() {
        assert_eq!(drain(sub), full, "replay + live must equal the full log exactly once");
    }

    Ok(())
}

#[test]
fn concurrent_producers_share_one_total_order() -> TestResult {
    init_tracing();
    let engine = engine();
    let run = engine.start("p", json!({}));
    let mut a = engine.subscribe(run)?;
    let mut b = engine.subscribe(run)?;

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let engine = engine.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    engine.ingest(run, RunEvent::log(LogLevel::Debug, format!("{p}-{i}")));
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().map_err(|_| "producer panicked")?;
    }

    let seen_a = drain(&mut a);
    let seen_b = drain(&mut b);
    assert_eq!(seen_a.len(), 1 + 4 * 250);
    assert_eq!(seen_a, seen_b);

    Ok(())
}
