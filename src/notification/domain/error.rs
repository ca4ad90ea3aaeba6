//! Error types for notification domain validation.

use crate::task::domain::TaskId;
use thiserror::Error;

/// Errors returned while constructing notification domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotificationDomainError {
    /// A notification was requested for a task without a completion time.
    #[error("task {0} has no completion timestamp")]
    NotCompleted(TaskId),

    /// The queue name is blank or contains whitespace.
    #[error("invalid queue name '{0}'")]
    InvalidQueueName(String),

    /// The consumer tag prefix is blank or contains whitespace.
    #[error("invalid consumer tag prefix '{0}'")]
    InvalidTagPrefix(String),

    /// The recipient manager name is blank.
    #[error("notification for task {0} names no manager")]
    BlankManager(TaskId),
}
