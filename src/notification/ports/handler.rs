//! Side effect performed for each consumed notification.

use crate::notification::domain::{ConsumerTag, Notification};
use async_trait::async_trait;

/// Metadata about the delivery being processed.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryContext<'a> {
    /// Tag of the consumer that received the delivery.
    pub consumer_tag: &'a ConsumerTag,
    /// Broker-assigned delivery tag.
    pub delivery_tag: u64,
}

/// Processes one decoded notification.
///
/// Deliveries are at-least-once: a handler may see the same notification
/// more than once and must tolerate it.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Handles a notification. Failures are the handler's to report.
    async fn handle(&self, notification: Notification, context: DeliveryContext<'_>);
}
