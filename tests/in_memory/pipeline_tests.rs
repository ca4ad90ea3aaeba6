//! End-to-end tests from task completion to consumed notification.

use super::helpers::{
    TestRuntime, broker, completed_on, directory, drain, handler, settings, task_service, user,
};
use chrono::{DateTime, Utc};
use foreman::{
    config::NotificationSettings,
    notification::{
        adapters::{InMemoryBroker, RecordingHandler},
        domain::Notification,
        services::ShutdownOutcome,
    },
    task::{
        adapters::memory::InMemoryManagerDirectory,
        services::{CreateTaskRequest, UpdateTaskRequest},
    },
};
use rstest::rstest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completion_reaches_consumer_once_per_manager(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
    directory: InMemoryManagerDirectory,
    completed_on: DateTime<Utc>,
) {
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), Arc::clone(&handler), &settings)
        .await
        .expect("runtime should build");
    let consumer_tracker = TaskTracker::new();
    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&consumer_tracker, shutdown.clone())
        .expect("consumer enabled");
    let fanout_tracker = TaskTracker::new();
    let service = task_service(runtime.publisher(), directory, fanout_tracker.clone());

    let created = service
        .create(CreateTaskRequest::new("replaced the compressor", user(3, "joel")))
        .await
        .expect("create should succeed");
    let updated = service
        .update(UpdateTaskRequest::new(created.id).completed_at(completed_on))
        .await
        .expect("update should succeed");
    assert!(updated.newly_completed);

    drain(&fanout_tracker).await;
    shutdown.cancel();
    assert_eq!(consumer.await.expect("supervisor joins"), ShutdownOutcome::Drained);

    let received = handler.received().expect("handler state");
    assert_eq!(received.len(), 2);
    let mut managers: Vec<&str> = received.iter().map(Notification::manager).collect();
    managers.sort_unstable();
    assert_eq!(managers, vec!["ana", "rui"]);
    for notification in &received {
        assert_eq!(notification.task_id(), created.id);
        assert_eq!(notification.completed_at(), completed_on);
        assert_eq!(notification.user().username(), "joel");
    }
    assert_eq!(broker.acknowledged().expect("broker state").len(), 2);
    for published in broker.published().expect("broker state") {
        assert_eq!(published.queue.as_str(), "notifications");
        assert_eq!(published.message.content_type, "application/json");
        assert!(!published.message.persistent);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_publish_does_not_block_other_managers(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
    directory: InMemoryManagerDirectory,
    completed_on: DateTime<Utc>,
) {
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), Arc::clone(&handler), &settings)
        .await
        .expect("runtime should build");
    let consumer_tracker = TaskTracker::new();
    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&consumer_tracker, shutdown.clone())
        .expect("consumer enabled");
    let fanout_tracker = TaskTracker::new();
    let service = task_service(runtime.publisher(), directory, fanout_tracker.clone());
    let created = service
        .create(CreateTaskRequest::new("bled the radiators", user(3, "joel")))
        .await
        .expect("create should succeed");
    broker.fail_next_publishes(1).expect("broker state");

    service
        .update(UpdateTaskRequest::new(created.id).completed_at(completed_on))
        .await
        .expect("update succeeds even when a publish fails");

    drain(&fanout_tracker).await;
    shutdown.cancel();
    consumer.await.expect("supervisor joins");
    assert_eq!(broker.published().expect("broker state").len(), 1);
    assert_eq!(handler.received().expect("handler state").len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn notifications_published_before_start_are_consumed(
    broker: Arc<InMemoryBroker>,
    handler: Arc<RecordingHandler>,
    settings: NotificationSettings,
    directory: InMemoryManagerDirectory,
) {
    let mut runtime = TestRuntime::with_channel(Arc::clone(&broker), Arc::clone(&handler), &settings)
        .await
        .expect("runtime should build");
    let fanout_tracker = TaskTracker::new();
    let service = task_service(runtime.publisher(), directory, fanout_tracker.clone());
    let created = service
        .create(CreateTaskRequest::new("swapped the fan belt", user(3, "joel")))
        .await
        .expect("create should succeed");
    service
        .complete(created.id)
        .await
        .expect("complete should succeed");
    drain(&fanout_tracker).await;
    assert_eq!(broker.queue_depth(&settings.queue).expect("broker state"), 2);

    let shutdown = CancellationToken::new();
    let consumer = runtime
        .start(&TaskTracker::new(), shutdown.clone())
        .expect("consumer enabled");
    shutdown.cancel();

    assert_eq!(consumer.await.expect("supervisor joins"), ShutdownOutcome::Drained);
    assert_eq!(handler.received().expect("handler state").len(), 2);
    assert_eq!(broker.queue_depth(&settings.queue).expect("broker state"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn log_only_runtime_completes_tasks_without_a_broker(
    directory: InMemoryManagerDirectory,
    completed_on: DateTime<Utc>,
) {
    let mut runtime = TestRuntime::log_only();
    assert!(runtime.start(&TaskTracker::new(), CancellationToken::new()).is_none());
    let fanout_tracker = TaskTracker::new();
    let service = task_service(runtime.publisher(), directory, fanout_tracker.clone());
    let created = service
        .create(CreateTaskRequest::new("reset the breaker", user(3, "joel")))
        .await
        .expect("create should succeed");

    let updated = service
        .update(UpdateTaskRequest::new(created.id).completed_at(completed_on))
        .await
        .expect("update should succeed");

    drain(&fanout_tracker).await;
    assert!(updated.newly_completed);
    assert_eq!(updated.task.completed_at, Some(completed_on));
}
