//! Log-only publisher used when no broker is configured.

use crate::notification::{
    domain::Notification,
    ports::{NotificationPublisher, PublishResult},
};
use async_trait::async_trait;
use tracing::info;

/// Publisher that records notifications in the log instead of a queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl NotificationPublisher for LogPublisher {
    async fn publish(&self, notification: &Notification) -> PublishResult<()> {
        info!(
            task_id = %notification.task_id(),
            manager = notification.manager(),
            "task completion published to log"
        );
        Ok(())
    }
}
