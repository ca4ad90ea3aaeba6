//! Queue-backed notification publisher.

use crate::notification::{
    domain::{CONTENT_TYPE_JSON, Notification, QueueName},
    ports::{MessageChannel, NotificationPublisher, OutboundMessage, PublishResult},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Publishes notifications as transient JSON messages on a durable queue.
///
/// Publishes through the shared channel are serialised: concurrent fan-out
/// workers take turns on the channel.
pub struct QueuePublisher<C>
where
    C: MessageChannel,
{
    channel: Arc<C>,
    queue: QueueName,
    gate: Mutex<()>,
}

impl<C> QueuePublisher<C>
where
    C: MessageChannel,
{
    /// Creates a publisher for `queue` over `channel`.
    #[must_use]
    pub fn new(channel: Arc<C>, queue: QueueName) -> Self {
        Self {
            channel,
            queue,
            gate: Mutex::new(()),
        }
    }

    /// Returns the destination queue.
    #[must_use]
    pub const fn queue(&self) -> &QueueName {
        &self.queue
    }
}

#[async_trait]
impl<C> NotificationPublisher for QueuePublisher<C>
where
    C: MessageChannel,
{
    async fn publish(&self, notification: &Notification) -> PublishResult<()> {
        let body = notification.to_json().inspect_err(|err| {
            warn!(
                task_id = %notification.task_id(),
                error = %err,
                "failed to encode notification"
            );
        })?;
        let message = OutboundMessage {
            content_type: CONTENT_TYPE_JSON.to_owned(),
            body,
            persistent: false,
        };

        let _turn = self.gate.lock().await;
        self.channel
            .publish(&self.queue, &message)
            .await
            .inspect_err(|err| {
                warn!(
                    task_id = %notification.task_id(),
                    queue = %self.queue,
                    error = %err,
                    "failed to publish task completion notification"
                );
            })?;
        debug!(
            task_id = %notification.task_id(),
            queue = %self.queue,
            "published task completion notification"
        );
        Ok(())
    }
}
