//! Task aggregate and its decrypted view.

use super::{CompletionUpdate, TaskId, User};
use crate::crypto::EncryptedField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task aggregate as held by persistence: the summary stays sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    summary: EncryptedField,
    completed_at: Option<DateTime<Utc>>,
    owner: User,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Sealed summary bytes.
    pub summary: EncryptedField,
    /// Completion timestamp, if the task has been completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Owning user.
    pub owner: User,
}

/// A task that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Sealed summary bytes.
    pub summary: EncryptedField,
    /// Completion timestamp supplied at creation, if any.
    pub completed_at: Option<DateTime<Utc>>,
    /// Owning user.
    pub owner: User,
}

impl NewTask {
    /// Attaches the identifier assigned by persistence.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task::from_persisted(PersistedTaskData {
            id,
            summary: self.summary,
            completed_at: self.completed_at,
            owner: self.owner,
        })
    }
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            summary: data.summary,
            completed_at: data.completed_at,
            owner: data.owner,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the sealed summary.
    #[must_use]
    pub const fn summary(&self) -> &EncryptedField {
        &self.summary
    }

    /// Returns the completion timestamp, if any.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the task has been completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Returns the owning user.
    #[must_use]
    pub const fn owner(&self) -> &User {
        &self.owner
    }

    /// Replaces the sealed summary with a freshly sealed value.
    pub fn replace_summary(&mut self, summary: EncryptedField) {
        self.summary = summary;
    }

    /// Applies a completion change.
    pub fn apply_completion(&mut self, update: CompletionUpdate) {
        match update {
            CompletionUpdate::Unchanged => {}
            CompletionUpdate::Set(timestamp) => self.completed_at = Some(timestamp),
            CompletionUpdate::Clear => self.completed_at = None,
        }
    }

    /// Transfers the task to another owner.
    pub fn reassign(&mut self, owner: User) {
        self.owner = owner;
    }
}

/// Decrypted task view returned to the request layer.
///
/// Only built after the caller has been authorised; never logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Task identifier.
    pub id: TaskId,
    /// Plaintext summary.
    pub summary: String,
    /// Completion timestamp, if any.
    #[serde(rename = "completedDate")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Owning user.
    #[serde(rename = "user")]
    pub owner: User,
}

impl TaskRecord {
    /// Combines a task with its opened summary.
    #[must_use]
    pub fn from_task(task: Task, summary: String) -> Self {
        Self {
            id: task.id,
            summary,
            completed_at: task.completed_at,
            owner: task.owner,
        }
    }
}
