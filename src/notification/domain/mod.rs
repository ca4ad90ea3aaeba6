//! Domain model for completion notifications and channel identity.

mod channel;
mod error;
mod message;
mod state;

pub use channel::{ConsumerTag, DEFAULT_CONSUMER_TAG_PREFIX, DEFAULT_QUEUE_NAME, QueueName};
pub use error::NotificationDomainError;
pub use message::{CONTENT_TYPE_JSON, Notification};
pub use state::ConsumerState;
