//! Queue and consumer identity.

use super::NotificationDomainError;
use std::fmt;
use uuid::Uuid;

/// Queue used when no name is configured.
pub const DEFAULT_QUEUE_NAME: &str = "notifications";

/// Consumer tag prefix used when none is configured.
pub const DEFAULT_CONSUMER_TAG_PREFIX: &str = "foreman-server";

fn is_valid_token(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

/// Name of the durable notification queue, shared across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueName(String);

impl QueueName {
    /// Creates a validated queue name.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::InvalidQueueName`] when the value
    /// is blank or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, NotificationDomainError> {
        let raw = value.into();
        if !is_valid_token(&raw) {
            return Err(NotificationDomainError::InvalidQueueName(raw));
        }
        Ok(Self(raw))
    }

    /// Returns the queue name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for QueueName {
    fn default() -> Self {
        Self(DEFAULT_QUEUE_NAME.to_owned())
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Process-unique label of one queue subscriber.
///
/// Formatted as `<prefix>-<uuid>` so that cancelling one consumer never
/// disturbs other instances reading the same queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConsumerTag(String);

impl ConsumerTag {
    /// Generates a fresh tag with the given prefix.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::InvalidTagPrefix`] when the prefix
    /// is blank or contains whitespace.
    pub fn generate(prefix: &str) -> Result<Self, NotificationDomainError> {
        if !is_valid_token(prefix) {
            return Err(NotificationDomainError::InvalidTagPrefix(prefix.to_owned()));
        }
        Ok(Self(format!("{prefix}-{}", Uuid::new_v4())))
    }

    /// Returns the tag as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConsumerTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ConsumerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
