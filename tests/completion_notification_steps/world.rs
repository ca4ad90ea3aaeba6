//! Shared world state for completion notification BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use eyre::{WrapErr, eyre};
use foreman::{
    config::NotificationSettings,
    crypto::FieldCipher,
    notification::{
        adapters::{InMemoryBroker, RecordingHandler},
        services::{NotificationRuntime, ShutdownOutcome},
    },
    task::{
        adapters::memory::{InMemoryManagerDirectory, InMemoryTaskRepository},
        domain::{TaskRecord, User, UserId},
        services::{CompletionFanout, TaskService},
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryTaskRepository, DefaultClock>;

const KEY: &str = "00112233445566778899aabbccddeeff";

/// Scenario world for completion notification behaviour tests.
pub struct NotificationWorld {
    pub broker: Arc<InMemoryBroker>,
    pub handler: Arc<RecordingHandler>,
    pub directory: InMemoryManagerDirectory,
    pub settings: NotificationSettings,
    pub fanout_tracker: TaskTracker,
    pub consumer_tracker: TaskTracker,
    pub shutdown: CancellationToken,
    pub service: Option<TestTaskService>,
    pub consumer: Option<JoinHandle<ShutdownOutcome>>,
    pub task: Option<TaskRecord>,
    pub outcome: Option<ShutdownOutcome>,
    pub stop_elapsed: Option<Duration>,
    next_user_id: i64,
}

impl NotificationWorld {
    /// Creates a world with an empty broker and directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            broker: Arc::new(InMemoryBroker::new()),
            handler: Arc::new(RecordingHandler::new()),
            directory: InMemoryManagerDirectory::new(),
            settings: NotificationSettings::default(),
            fanout_tracker: TaskTracker::new(),
            consumer_tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            service: None,
            consumer: None,
            task: None,
            outcome: None,
            stop_elapsed: None,
            next_user_id: 1,
        }
    }

    /// Builds a user with the next free identifier.
    pub fn next_user(&mut self, name: &str) -> Result<User, eyre::Report> {
        let id = UserId::new(self.next_user_id).wrap_err("allocate user id")?;
        self.next_user_id += 1;
        User::new(id, name).wrap_err("construct user")
    }

    /// Starts the consumer and wires the task service to the publisher.
    pub fn start_pipeline(&mut self) -> Result<(), eyre::Report> {
        let mut runtime = run_async(NotificationRuntime::with_channel(
            Arc::clone(&self.broker),
            Arc::clone(&self.handler),
            &self.settings,
        ))
        .wrap_err("provision notifications queue")?;
        self.consumer = runtime.start(&self.consumer_tracker, self.shutdown.clone());

        let fanout = CompletionFanout::new(
            runtime.publisher(),
            Arc::new(self.directory.clone()),
            self.fanout_tracker.clone(),
        );
        let cipher = FieldCipher::from_hex_key(KEY).wrap_err("build field cipher")?;
        self.service = Some(TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(cipher),
            fanout,
            Arc::new(DefaultClock),
        ));
        Ok(())
    }

    /// Returns the running task service.
    pub fn service(&self) -> Result<&TestTaskService, eyre::Report> {
        self.service
            .as_ref()
            .ok_or_else(|| eyre!("notification pipeline has not been started"))
    }

    /// Waits for outstanding fan-out, then stops the consumer.
    ///
    /// Repeated calls are no-ops.
    pub fn settle(&mut self) -> Result<(), eyre::Report> {
        if self.outcome.is_some() {
            return Ok(());
        }
        self.fanout_tracker.close();
        run_async(self.fanout_tracker.wait());

        let started = tokio::time::Instant::now();
        self.shutdown.cancel();
        let handle = self
            .consumer
            .take()
            .ok_or_else(|| eyre!("notification consumer was not started"))?;
        let outcome = run_async(handle).wrap_err("join consumer supervisor")?;
        self.consumer_tracker.close();
        run_async(self.consumer_tracker.wait());
        self.stop_elapsed = Some(started.elapsed());
        self.outcome = Some(outcome);
        Ok(())
    }
}

impl Default for NotificationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> NotificationWorld {
    NotificationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
