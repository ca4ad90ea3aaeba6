//! Shared test helpers for in-memory notification pipeline tests.

use chrono::{DateTime, TimeZone, Utc};
use foreman::{
    config::NotificationSettings,
    crypto::FieldCipher,
    notification::{
        adapters::{InMemoryBroker, RecordingHandler},
        ports::NotificationPublisher,
        services::NotificationRuntime,
    },
    task::{
        adapters::memory::{InMemoryManagerDirectory, InMemoryTaskRepository},
        domain::{Role, User, UserId},
        services::{CompletionFanout, TaskService},
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

/// Runtime wired to the in-memory broker.
pub type TestRuntime = NotificationRuntime<InMemoryBroker, RecordingHandler>;

/// Task service type used by the pipeline tests.
pub type TestTaskService = TaskService<InMemoryTaskRepository, DefaultClock>;

/// Hex key used for every test cipher.
pub const KEY: &str = "00112233445566778899aabbccddeeff0011223344556677";

/// Provides a fresh broker for each test.
#[fixture]
pub fn broker() -> Arc<InMemoryBroker> {
    Arc::new(InMemoryBroker::new())
}

/// Provides a handler that records consumed notifications.
#[fixture]
pub fn handler() -> Arc<RecordingHandler> {
    Arc::new(RecordingHandler::new())
}

/// Provides default queue settings.
#[fixture]
pub fn settings() -> NotificationSettings {
    NotificationSettings::default()
}

/// Provides the completion timestamp used across scenarios.
#[fixture]
pub fn completed_on() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 10, 23, 22, 50, 23)
        .single()
        .expect("valid timestamp")
}

/// Builds a user with the given identifier and name.
#[must_use]
pub fn user(id: i64, name: &str) -> User {
    User::new(UserId::new(id).expect("valid id"), name).expect("valid user")
}

/// Provides a directory holding managers "ana" and "rui" and technician "joel".
#[fixture]
pub fn directory() -> InMemoryManagerDirectory {
    let directory = InMemoryManagerDirectory::new();
    for (member, role) in [
        (user(1, "ana"), Role::Manager),
        (user(2, "rui"), Role::Manager),
        (user(3, "joel"), Role::Technician),
    ] {
        directory.add_user(member, role).expect("directory state");
    }
    directory
}

/// Builds a task service publishing through `publisher`.
#[must_use]
pub fn task_service(
    publisher: Arc<dyn NotificationPublisher>,
    directory: InMemoryManagerDirectory,
    tracker: TaskTracker,
) -> TestTaskService {
    TaskService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(FieldCipher::from_hex_key(KEY).expect("valid key")),
        CompletionFanout::new(publisher, Arc::new(directory), tracker),
        Arc::new(DefaultClock),
    )
}

/// Waits for all work spawned on `tracker` so far.
pub async fn drain(tracker: &TaskTracker) {
    tracker.close();
    tracker.wait().await;
    tracker.reopen();
}
