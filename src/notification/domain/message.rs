//! The notification message exchanged over the broker.

use super::NotificationDomainError;
use crate::task::domain::{Task, TaskId, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type declared on every published notification.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Tells one manager that a task was completed.
///
/// The wire form is a JSON object with `id`, `manager`, `completedDate`
/// (RFC 3339) and the owning `user` (`id`, `username`). The task summary is
/// never part of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NotificationFields")]
pub struct Notification {
    id: TaskId,
    manager: String,
    #[serde(rename = "completedDate")]
    completed_at: DateTime<Utc>,
    user: User,
}

#[derive(Deserialize)]
struct NotificationFields {
    id: TaskId,
    manager: String,
    #[serde(rename = "completedDate")]
    completed_at: DateTime<Utc>,
    user: User,
}

impl TryFrom<NotificationFields> for Notification {
    type Error = NotificationDomainError;

    fn try_from(fields: NotificationFields) -> Result<Self, Self::Error> {
        let manager = fields.manager.trim();
        if manager.is_empty() {
            return Err(NotificationDomainError::BlankManager(fields.id));
        }
        Ok(Self {
            id: fields.id,
            manager: manager.to_owned(),
            completed_at: fields.completed_at,
            user: fields.user,
        })
    }
}

impl Notification {
    /// Builds the notification for `manager` about a completed `task`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationDomainError::NotCompleted`] when the task has no
    /// completion timestamp.
    pub fn for_manager(task: &Task, manager: &User) -> Result<Self, NotificationDomainError> {
        let completed_at = task
            .completed_at()
            .ok_or(NotificationDomainError::NotCompleted(task.id()))?;
        Ok(Self {
            id: task.id(),
            manager: manager.username().to_owned(),
            completed_at,
            user: task.owner().clone(),
        })
    }

    /// Returns the completed task's identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.id
    }

    /// Returns the recipient manager's display name.
    #[must_use]
    pub fn manager(&self) -> &str {
        &self.manager
    }

    /// Returns when the task was completed.
    #[must_use]
    pub const fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Returns the user who owns the task.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    /// Serializes the notification to its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns a serialization error from `serde_json`.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a notification from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when the payload is malformed or
    /// carries an invalid identifier, a blank username or a blank manager.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
