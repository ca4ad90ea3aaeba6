//! Broker channel port.
//!
//! A [`MessageChannel`] exposes the handful of broker operations the
//! notification pipeline needs: idempotent queue declaration, publishing to
//! a queue through the default exchange, subscribing under a consumer tag,
//! cancelling that subscription, and closing the channel.

use crate::notification::domain::{ConsumerTag, QueueName};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for message channel operations.
pub type MessageChannelResult<T> = Result<T, MessageChannelError>;

/// Stream of deliveries for one consumer tag.
///
/// The stream ends once the broker confirms cancellation of the consumer or
/// the channel closes.
pub type DeliveryStream = BoxStream<'static, MessageChannelResult<InboundDelivery>>;

/// Message handed to the broker for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// MIME type of `body`.
    pub content_type: String,
    /// Encoded payload.
    pub body: Vec<u8>,
    /// Whether the broker should persist the message to disk.
    pub persistent: bool,
}

/// Acknowledges one delivery back to the broker.
#[async_trait]
pub trait DeliveryAcker: Send + Sync {
    /// Acknowledges the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`MessageChannelError`] when the broker rejects the ack, for
    /// example because the channel closed.
    async fn ack(&self) -> MessageChannelResult<()>;
}

/// A message received from a queue, awaiting acknowledgement.
pub struct InboundDelivery {
    /// Broker-assigned delivery tag.
    pub delivery_tag: u64,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Raw payload.
    pub body: Vec<u8>,
    acker: Box<dyn DeliveryAcker>,
}

impl InboundDelivery {
    /// Creates a delivery with the given acknowledgement handle.
    #[must_use]
    pub fn new(
        delivery_tag: u64,
        content_type: Option<String>,
        body: Vec<u8>,
        acker: Box<dyn DeliveryAcker>,
    ) -> Self {
        Self {
            delivery_tag,
            content_type,
            body,
            acker,
        }
    }

    /// Acknowledges the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`MessageChannelError`] when the broker rejects the ack.
    pub async fn ack(&self) -> MessageChannelResult<()> {
        self.acker.ack().await
    }
}

impl fmt::Debug for InboundDelivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundDelivery")
            .field("delivery_tag", &self.delivery_tag)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Broker channel contract.
///
/// Implementations need not support concurrent publishing; callers that
/// share a channel between workers serialise their publishes.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Declares a durable, non-exclusive, non-auto-deleted queue.
    ///
    /// Declaring an existing queue with the same properties succeeds.
    async fn declare_queue(&self, queue: &QueueName) -> MessageChannelResult<()>;

    /// Publishes a message to `queue` through the default exchange.
    async fn publish(&self, queue: &QueueName, message: &OutboundMessage)
    -> MessageChannelResult<()>;

    /// Subscribes to `queue` with manual acknowledgement under `tag`.
    async fn consume(&self, queue: &QueueName, tag: &ConsumerTag)
    -> MessageChannelResult<DeliveryStream>;

    /// Asks the broker to stop delivering to `tag`.
    async fn cancel(&self, tag: &ConsumerTag) -> MessageChannelResult<()>;

    /// Closes the channel, releasing broker resources.
    async fn close(&self) -> MessageChannelResult<()>;
}

/// Errors returned by message channel adapters.
#[derive(Debug, Clone, Error)]
pub enum MessageChannelError {
    /// The channel has already been closed.
    #[error("message channel is closed")]
    Closed,

    /// No consumer with the given tag exists on this channel.
    #[error("unknown consumer tag {0}")]
    UnknownConsumer(ConsumerTag),

    /// Broker or transport failure.
    #[error("broker error: {0}")]
    Broker(Arc<dyn std::error::Error + Send + Sync>),
}

impl MessageChannelError {
    /// Wraps a broker error.
    pub fn broker(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Broker(Arc::new(err))
    }
}
