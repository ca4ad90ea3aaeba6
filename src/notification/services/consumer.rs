//! Queue consumer with an explicit lifecycle.
//!
//! A [`NotificationConsumer`] moves through [`ConsumerState`] in one
//! direction only. Provisioning declares the durable queue; starting
//! subscribes under a unique consumer tag and spawns the processing loop;
//! cancelling asks the broker to stop deliveries so the loop can drain;
//! closing releases the channel. Every delivery is acknowledged after its
//! handler returns, including deliveries that fail to decode.

use crate::notification::{
    domain::{ConsumerState, ConsumerTag, Notification, NotificationDomainError, QueueName},
    ports::{
        DeliveryContext, DeliveryStream, InboundDelivery, MessageChannel, MessageChannelError,
        NotificationHandler,
    },
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Errors returned by consumer lifecycle operations.
#[derive(Debug, Error)]
pub enum ConsumerError {
    /// The queue could not be declared.
    #[error("failed to declare queue '{queue}': {source}")]
    Provision {
        /// Queue being declared.
        queue: QueueName,
        /// Underlying channel error.
        source: MessageChannelError,
    },

    /// The broker refused the subscription.
    #[error("failed to start consumer '{tag}': {source}")]
    Consume {
        /// Tag of the consumer.
        tag: ConsumerTag,
        /// Underlying channel error.
        source: MessageChannelError,
    },

    /// The requested lifecycle step is not valid from the current state.
    #[error("consumer '{tag}' cannot move from {from} to {to}")]
    InvalidState {
        /// Tag of the consumer.
        tag: ConsumerTag,
        /// Current state.
        from: ConsumerState,
        /// Requested state.
        to: ConsumerState,
    },

    /// Queue or tag configuration was invalid.
    #[error(transparent)]
    Domain(#[from] NotificationDomainError),
}

/// Result of waiting for the processing loop to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The delivery stream ended and every received delivery was handled.
    Drained,
    /// The bound elapsed while the loop was still running.
    TimedOut,
}

/// Consumer of the notification queue.
pub struct NotificationConsumer<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    channel: Arc<C>,
    handler: Arc<H>,
    queue: QueueName,
    tag: ConsumerTag,
    state: ConsumerState,
    worker: Option<JoinHandle<()>>,
}

impl<C, H> NotificationConsumer<C, H>
where
    C: MessageChannel + 'static,
    H: NotificationHandler + 'static,
{
    /// Creates an idle consumer with a freshly generated tag.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Domain`] when `tag_prefix` is invalid.
    pub fn new(
        channel: Arc<C>,
        handler: Arc<H>,
        queue: QueueName,
        tag_prefix: &str,
    ) -> Result<Self, ConsumerError> {
        let tag = ConsumerTag::generate(tag_prefix)?;
        Ok(Self {
            channel,
            handler,
            queue,
            tag,
            state: ConsumerState::Idle,
            worker: None,
        })
    }

    /// Returns the consumer tag.
    #[must_use]
    pub const fn tag(&self) -> &ConsumerTag {
        &self.tag
    }

    /// Returns the consumed queue.
    #[must_use]
    pub const fn queue(&self) -> &QueueName {
        &self.queue
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConsumerState {
        self.state
    }

    fn ensure_transition(&self, to: ConsumerState) -> Result<(), ConsumerError> {
        if self.state.can_transition_to(to) {
            Ok(())
        } else {
            Err(ConsumerError::InvalidState {
                tag: self.tag.clone(),
                from: self.state,
                to,
            })
        }
    }

    /// Declares the durable queue.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Provision`] when the broker rejects the
    /// declaration, or [`ConsumerError::InvalidState`] when not idle.
    pub async fn provision(&mut self) -> Result<(), ConsumerError> {
        self.ensure_transition(ConsumerState::Provisioned)?;
        self.channel
            .declare_queue(&self.queue)
            .await
            .map_err(|source| {
                error!(queue = %self.queue, error = %source, "failed to declare notifications queue");
                ConsumerError::Provision {
                    queue: self.queue.clone(),
                    source,
                }
            })?;
        self.state = ConsumerState::Provisioned;
        debug!(queue = %self.queue, consumer_tag = %self.tag, "notifications queue declared");
        Ok(())
    }

    /// Subscribes to the queue and spawns the processing loop.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Consume`] when the broker refuses the
    /// subscription; the consumer stays provisioned and can still be closed.
    /// Returns [`ConsumerError::InvalidState`] when not provisioned.
    pub async fn start(&mut self) -> Result<(), ConsumerError> {
        self.ensure_transition(ConsumerState::Consuming)?;
        let deliveries = self
            .channel
            .consume(&self.queue, &self.tag)
            .await
            .map_err(|source| {
                error!(
                    queue = %self.queue,
                    consumer_tag = %self.tag,
                    error = %source,
                    "failed to consume notifications queue"
                );
                ConsumerError::Consume {
                    tag: self.tag.clone(),
                    source,
                }
            })?;
        self.worker = Some(tokio::spawn(process_deliveries(
            deliveries,
            Arc::clone(&self.handler),
            self.tag.clone(),
        )));
        self.state = ConsumerState::Consuming;
        Ok(())
    }

    /// Requests broker-side cancellation of the subscription.
    ///
    /// The consumer enters `Cancelling` even when the broker call fails, so
    /// that shutdown can proceed to closing the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::InvalidState`] when not consuming.
    pub async fn cancel(&mut self) -> Result<(), ConsumerError> {
        self.ensure_transition(ConsumerState::Cancelling)?;
        self.state = ConsumerState::Cancelling;
        if let Err(err) = self.channel.cancel(&self.tag).await {
            warn!(consumer_tag = %self.tag, error = %err, "failed to cancel notifications consumer");
        }
        Ok(())
    }

    /// Waits up to `bound` for the processing loop to finish.
    ///
    /// Returns [`DrainOutcome::Drained`] immediately when no loop was
    /// started. After a timeout the loop is left running until the channel
    /// closes.
    pub async fn wait_drained(&mut self, bound: Duration) -> DrainOutcome {
        let Some(mut worker) = self.worker.take() else {
            return DrainOutcome::Drained;
        };
        match tokio::time::timeout(bound, &mut worker).await {
            Ok(Ok(())) => DrainOutcome::Drained,
            Ok(Err(err)) => {
                warn!(consumer_tag = %self.tag, error = %err, "notifications consumer loop failed");
                DrainOutcome::Drained
            }
            Err(_) => {
                warn!(
                    consumer_tag = %self.tag,
                    bound = ?bound,
                    "notifications consumer did not drain in time"
                );
                DrainOutcome::TimedOut
            }
        }
    }

    /// Closes the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::InvalidState`] when the consumer is still
    /// consuming or already closed. Channel failures are logged.
    pub async fn close(&mut self) -> Result<(), ConsumerError> {
        self.ensure_transition(ConsumerState::Closed)?;
        self.state = ConsumerState::Closed;
        if let Err(err) = self.channel.close().await {
            warn!(consumer_tag = %self.tag, error = %err, "failed to close notifications channel");
        }
        Ok(())
    }
}

async fn process_deliveries<H>(mut deliveries: DeliveryStream, handler: Arc<H>, tag: ConsumerTag)
where
    H: NotificationHandler,
{
    info!(consumer_tag = %tag, "started notifications consumer");
    while let Some(next) = deliveries.next().await {
        match next {
            Ok(delivery) => process_delivery(handler.as_ref(), &tag, delivery).await,
            Err(err) => warn!(consumer_tag = %tag, error = %err, "notifications delivery failed"),
        }
    }
    info!(consumer_tag = %tag, "notifications consumer stopped");
}

async fn process_delivery<H>(handler: &H, tag: &ConsumerTag, delivery: InboundDelivery)
where
    H: NotificationHandler,
{
    let context = DeliveryContext {
        consumer_tag: tag,
        delivery_tag: delivery.delivery_tag,
    };
    match Notification::from_json(&delivery.body) {
        Ok(notification) => handler.handle(notification, context).await,
        Err(err) => warn!(
            consumer_tag = %tag,
            delivery_tag = delivery.delivery_tag,
            content_type = delivery.content_type.as_deref().unwrap_or("unset"),
            error = %err,
            "discarding malformed notification"
        ),
    }
    if let Err(err) = delivery.ack().await {
        warn!(
            consumer_tag = %tag,
            delivery_tag = delivery.delivery_tag,
            error = %err,
            "failed to acknowledge notification"
        );
    }
}
