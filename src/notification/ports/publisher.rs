//! Publisher capability used by completion fan-out.

use super::MessageChannelError;
use crate::notification::domain::Notification;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for publish calls.
pub type PublishResult<T> = Result<T, PublishError>;

/// Emits one notification, at most once per call.
///
/// The process picks one implementation at startup (queue-backed or
/// log-only) and holds it as `Arc<dyn NotificationPublisher>`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    /// Publishes `notification`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when encoding fails or the channel rejects
    /// the message. No retry is attempted.
    async fn publish(&self, notification: &Notification) -> PublishResult<()>;
}

/// Errors returned by notification publishers.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The notification could not be encoded.
    #[error("failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    /// The channel rejected the message.
    #[error(transparent)]
    Channel(#[from] MessageChannelError),
}
