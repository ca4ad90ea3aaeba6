//! Start-up wiring for the publishing and consuming halves.

use super::{
    consumer::{ConsumerError, NotificationConsumer},
    coordinator::{ConsumerCoordinator, ShutdownOutcome},
    publisher::QueuePublisher,
};
use crate::config::NotificationSettings;
use crate::notification::{
    adapters::LogPublisher,
    ports::{MessageChannel, NotificationHandler, NotificationPublisher},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// The publisher and consumer coordinator chosen at start-up.
///
/// With a broker channel, notifications are published to and consumed from
/// the configured queue. Without one, notifications are only logged and no
/// consumer runs.
pub struct NotificationRuntime<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    publisher: Arc<dyn NotificationPublisher>,
    coordinator: ConsumerCoordinator<C, H>,
}

impl<C, H> NotificationRuntime<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    /// Provisions the queue on `channel` and prepares both halves.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError`] when the tag prefix is invalid or the queue
    /// cannot be declared. Both are fatal at start-up.
    pub async fn with_channel(
        channel: Arc<C>,
        handler: Arc<H>,
        settings: &NotificationSettings,
    ) -> Result<Self, ConsumerError> {
        let mut consumer = NotificationConsumer::new(
            Arc::clone(&channel),
            handler,
            settings.queue.clone(),
            &settings.consumer_tag_prefix,
        )?;
        consumer.provision().await?;
        info!(
            queue = %settings.queue,
            consumer_tag = %consumer.tag(),
            "notifications queue provisioned"
        );
        Ok(Self {
            publisher: Arc::new(QueuePublisher::new(channel, settings.queue.clone())),
            coordinator: ConsumerCoordinator::new(consumer)
                .with_shutdown_timeout(settings.shutdown_timeout),
        })
    }

    /// Log-only publishing with no consumer.
    #[must_use]
    pub fn log_only() -> Self {
        info!("no broker configured; task completion notifications will be logged");
        Self {
            publisher: Arc::new(LogPublisher),
            coordinator: ConsumerCoordinator::disabled(),
        }
    }

    /// Returns the shared publisher handed to completion fan-out.
    #[must_use]
    pub fn publisher(&self) -> Arc<dyn NotificationPublisher> {
        Arc::clone(&self.publisher)
    }

    /// Starts the consumer, if any. See [`ConsumerCoordinator::start`].
    pub fn start(
        &mut self,
        tracker: &TaskTracker,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<ShutdownOutcome>> {
        self.coordinator.start(tracker, shutdown)
    }
}
