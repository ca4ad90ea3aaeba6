//! Consumer shutdown behaviour through the notification runtime.

use super::helpers::{TestRuntime, broker, handler, settings};
use foreman::{
    config::NotificationSettings,
    notification::{
        adapters::{InMemoryBroker, RecordingHandler},
        services::{DEFAULT_SHUTDOWN_TIMEOUT, ShutdownOutcome},
    },
};
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[rstest]
#[tokio::test(start_paused = true)]
async fn stuck_consumer_is_abandoned_after_the_bound(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
) {
    broker.hold_streams_on_cancel().expect("broker state");
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), handler, &settings)
        .await
        .expect("runtime should build");
    let tracker = TaskTracker::new();
    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&tracker, shutdown.clone())
        .expect("consumer enabled");

    let begun = Instant::now();
    shutdown.cancel();
    tracker.close();
    tracker.wait().await;

    assert!(begun.elapsed() >= DEFAULT_SHUTDOWN_TIMEOUT);
    assert!(begun.elapsed() < DEFAULT_SHUTDOWN_TIMEOUT + Duration::from_secs(1));
    assert_eq!(consumer.await.expect("supervisor joins"), ShutdownOutcome::TimedOut);
    assert!(broker.is_closed().expect("broker state"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consumer_cancels_only_its_own_tag(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
) {
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), handler, &settings)
        .await
        .expect("runtime should build");
    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&TaskTracker::new(), shutdown.clone())
        .expect("consumer enabled");

    shutdown.cancel();
    assert_eq!(consumer.await.expect("supervisor joins"), ShutdownOutcome::Drained);

    let cancelled = broker.cancelled().expect("broker state");
    assert_eq!(cancelled.len(), 1);
    assert!(
        cancelled
            .iter()
            .all(|tag| tag.as_str().starts_with("foreman-server-"))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn consumer_start_failure_still_closes_channel(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
) {
    broker.reject_consume().expect("broker state");
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), handler, &settings)
        .await
        .expect("declaration still succeeds");
    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&TaskTracker::new(), shutdown.clone())
        .expect("consumer enabled");

    shutdown.cancel();

    assert_eq!(
        consumer.await.expect("supervisor joins"),
        ShutdownOutcome::FailedToStart
    );
    assert!(broker.is_closed().expect("broker state"));
}
