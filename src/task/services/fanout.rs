//! Completion fan-out: one notification per manager, per completion edge.

use crate::notification::{
    domain::{Notification, NotificationDomainError},
    ports::NotificationPublisher,
};
use crate::task::{
    domain::Task,
    ports::{ManagerDirectory, ManagerDirectoryError},
};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Errors that abort a fan-out before anything is published.
#[derive(Debug, Error)]
pub enum FanoutError {
    /// Recipients could not be resolved.
    #[error(transparent)]
    Recipients(#[from] ManagerDirectoryError),

    /// The task was not in a notifiable state.
    #[error(transparent)]
    Domain(#[from] NotificationDomainError),
}

/// Tally of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanoutReport {
    /// Managers resolved at dispatch time.
    pub recipients: usize,
    /// Notifications the publisher accepted.
    pub published: usize,
    /// Notifications the publisher rejected.
    pub failed: usize,
}

/// Dispatches completion notifications off the request path.
///
/// Each manager's notification is published independently; one failure
/// neither blocks nor retries the others.
#[derive(Clone)]
pub struct CompletionFanout {
    publisher: Arc<dyn NotificationPublisher>,
    directory: Arc<dyn ManagerDirectory>,
    tracker: TaskTracker,
}

impl CompletionFanout {
    /// Creates a fan-out whose background work is tracked by `tracker`.
    #[must_use]
    pub const fn new(
        publisher: Arc<dyn NotificationPublisher>,
        directory: Arc<dyn ManagerDirectory>,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            publisher,
            directory,
            tracker,
        }
    }

    /// Spawns the fan-out for `task` and returns immediately.
    pub fn dispatch(&self, task: Task) {
        let fanout = self.clone();
        self.tracker.spawn(async move {
            // Failures are logged inside.
            if let Ok(report) = fanout.notify_on_completion(&task).await {
                debug!(task_id = %task.id(), ?report, "completion fan-out finished");
            }
        });
    }

    /// Publishes one notification per manager for a completed task.
    ///
    /// # Errors
    ///
    /// Returns [`FanoutError::Recipients`] when managers cannot be listed and
    /// [`FanoutError::Domain`] when the task has no completion timestamp.
    /// Individual publish failures are counted in the report, not returned.
    pub async fn notify_on_completion(&self, task: &Task) -> Result<FanoutReport, FanoutError> {
        let managers = self.directory.list_managers().await.inspect_err(|err| {
            warn!(task_id = %task.id(), error = %err, "failed to resolve notification recipients");
        })?;
        let notifications = managers
            .iter()
            .map(|manager| Notification::for_manager(task, manager))
            .collect::<Result<Vec<_>, _>>()?;

        let outcomes = join_all(notifications.iter().map(|notification| async move {
            let result = self.publisher.publish(notification).await;
            if let Err(err) = &result {
                warn!(
                    task_id = %notification.task_id(),
                    manager = notification.manager(),
                    error = %err,
                    "failed to deliver task completion notification"
                );
            }
            result.is_ok()
        }))
        .await;

        let published = outcomes.iter().filter(|accepted| **accepted).count();
        let report = FanoutReport {
            recipients: managers.len(),
            published,
            failed: outcomes.len() - published,
        };
        info!(
            task_id = %task.id(),
            recipients = report.recipients,
            published = report.published,
            failed = report.failed,
            "task completion fanned out"
        );
        Ok(report)
    }
}
