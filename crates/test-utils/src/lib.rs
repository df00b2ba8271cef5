pub mod builders;
pub mod fake_driver;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use runhub::{RunEvent, Subscription};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Everything currently buffered on `sub`.
pub fn drain(sub: &mut Subscription) -> Vec<RunEvent> {
    sub.drain_buffered()
}

/// Receive events until a terminal status arrives (inclusive) or the feed ends.
pub async fn collect_until_terminal(sub: &mut Subscription) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.recv().await {
        let terminal = event.as_status().is_some_and(|s| s.is_terminal());
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}
