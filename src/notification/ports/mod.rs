//! Port contracts for the notification channel.

pub mod channel;
pub mod handler;
pub mod publisher;

pub use channel::{
    DeliveryAcker, DeliveryStream, InboundDelivery, MessageChannel, MessageChannelError,
    MessageChannelResult, OutboundMessage,
};
pub use handler::{DeliveryContext, NotificationHandler};
pub use publisher::{NotificationPublisher, PublishError, PublishResult};
