// tests/replay_property.rs

mod common;
use crate::common::{drain, engine};

use proptest::prelude::*;
use serde_json::json;

use runhub::{LogLevel, RunEvent, RunStatus};

fn event_strategy() -> impl Strategy<Value = RunEvent> {
    prop_oneof![
        prop_oneof![
            Just(RunStatus::Running),
            Just(RunStatus::Paused),
            Just(RunStatus::Starting),
        ]
        .prop_map(RunEvent::status),
        "[a-z ]{0,12}".prop_map(|m| RunEvent::log(LogLevel::Info, m)),
        (0.0f64..1.0, proptest::option::of(0u64..100))
            .prop_map(|(v, step)| RunEvent::metric("score", v, step)),
        (0u32..50).prop_map(|i| RunEvent::progress(json!({ "iteration": i }))),
    ]
}

proptest! {
    /// Whatever the producer sends and wherever a subscriber joins, its
    /// replay plus live feed equals what an early subscriber saw.
    #[test]
    fn late_join_matches_early_feed(
        events in proptest::collection::vec(event_strategy(), 0..60),
        join_at in 0usize..60,
    ) {
        let engine = engine();
        let run = engine.start("p", json!({}));
        let mut early = engine.subscribe(run).unwrap();

        let join_at = join_at.min(events.len());
        let mut late = None;
        for (i, event) in events.into_iter().enumerate() {
            if i == join_at {
                late = Some(engine.subscribe(run).unwrap());
            }
            engine.ingest(run, event);
        }
        let mut late = match late {
            Some(sub) => sub,
            None => engine.subscribe(run).unwrap(),
        };

        let early_seen = drain(&mut early);
        let late_seen = drain(&mut late);
        prop_assert_eq!(&early_seen, &late_seen);

        let summary = engine.summary(run).unwrap();
        prop_assert_eq!(summary.event_count, early_seen.len());
        prop_assert_eq!(early_seen[0].as_status(), Some(RunStatus::Starting));
    }

    /// Statuses in the log always form a legal walk of the state machine.
    #[test]
    fn logged_statuses_are_legal_transitions(
        events in proptest::collection::vec(event_strategy(), 0..60),
    ) {
        let engine = engine();
        let run = engine.start("p", json!({}));
        let mut sub = engine.subscribe(run).unwrap();
        for event in events {
            engine.ingest(run, event);
        }

        let statuses: Vec<RunStatus> = drain(&mut sub).iter().filter_map(RunEvent::as_status).collect();
        for pair in statuses.windows(2) {
            prop_assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }
}
