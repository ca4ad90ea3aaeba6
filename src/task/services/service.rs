//! Task orchestration: sealing on write, opening on read, and completion
//! detection against the stored record.

use super::CompletionFanout;
use crate::crypto::{CipherError, EncryptedField, FieldCipher};
use crate::task::{
    domain::{
        CompletionUpdate, NewTask, Task, TaskDomainError, TaskId, TaskRecord, User, UserId,
        is_newly_completed,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    summary: String,
    owner: User,
    completed_at: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request for an open task.
    #[must_use]
    pub fn new(summary: impl Into<String>, owner: User) -> Self {
        Self {
            summary: summary.into(),
            owner,
            completed_at: None,
        }
    }

    /// Records the task as already completed.
    #[must_use]
    pub const fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }
}

/// Request payload for a partial task update.
///
/// Fields left unset keep their stored values. An empty summary also keeps
/// the stored summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    id: TaskId,
    summary: Option<String>,
    completion: CompletionUpdate,
    owner: Option<User>,
}

impl UpdateTaskRequest {
    /// Creates an update that changes nothing yet.
    #[must_use]
    pub const fn new(id: TaskId) -> Self {
        Self {
            id,
            summary: None,
            completion: CompletionUpdate::Unchanged,
            owner: None,
        }
    }

    /// Replaces the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the completion change explicitly.
    #[must_use]
    pub const fn with_completion(mut self, completion: CompletionUpdate) -> Self {
        self.completion = completion;
        self
    }

    /// Marks the task completed at `completed_at`.
    #[must_use]
    pub const fn completed_at(self, completed_at: DateTime<Utc>) -> Self {
        self.with_completion(CompletionUpdate::Set(completed_at))
    }

    /// Clears the completion timestamp.
    #[must_use]
    pub const fn clear_completion(self) -> Self {
        self.with_completion(CompletionUpdate::Clear)
    }

    /// Transfers the task to `owner`.
    #[must_use]
    pub fn with_owner(mut self, owner: User) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns the target task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }
}

/// Outcome of an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Decrypted view of the stored task.
    pub task: TaskRecord,
    /// Whether this update completed the task and triggered fan-out.
    pub newly_completed: bool,
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// No task exists with the identifier.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Sealing or opening the summary failed.
    #[error("task data could not be processed")]
    Cipher(#[from] CipherError),
}

impl TaskServiceError {
    /// Returns whether the error should surface as a generic server error.
    ///
    /// Cipher and persistence failures are internal; their details must not
    /// reach the caller.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Cipher(_) | Self::Repository(TaskRepositoryError::Persistence(_))
        )
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
#[derive(Clone)]
pub struct TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    cipher: Arc<FieldCipher>,
    fanout: CompletionFanout,
    clock: Arc<C>,
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        cipher: Arc<FieldCipher>,
        fanout: CompletionFanout,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            cipher,
            fanout,
            clock,
        }
    }

    /// Seals the summary and stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Cipher`] when sealing fails and
    /// [`TaskServiceError::Repository`] when the store rejects the insert.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskServiceResult<TaskRecord> {
        let summary = self.cipher.seal(&request.summary).inspect_err(|err| {
            warn!(user_id = %request.owner.id(), error = %err, "failed to seal new task summary");
        })?;
        let task = self
            .repository
            .insert(NewTask {
                summary,
                completed_at: request.completed_at,
                owner: request.owner,
            })
            .await?;
        info!(task_id = %task.id(), user_id = %task.owner().id(), "task created");
        Ok(TaskRecord::from_task(task, request.summary))
    }

    /// Loads a task and opens its summary for `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for unknown tasks and
    /// [`TaskServiceError::Cipher`] when the stored summary cannot be opened.
    pub async fn get(&self, id: TaskId, requester: UserId) -> TaskServiceResult<TaskRecord> {
        let task = self.load(id).await?;
        info!(task_id = %id, user_id = %requester, "task decryption requested");
        self.decrypt(task)
    }

    /// Applies a partial update and dispatches fan-out on a completion edge.
    ///
    /// Completion is judged against the record read before the update was
    /// applied. The summary is opened before anything is persisted, so an
    /// unreadable task is never changed. Fan-out runs detached; this call
    /// does not wait for it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for unknown tasks,
    /// [`TaskServiceError::Cipher`] when sealing or opening fails, and
    /// [`TaskServiceError::Repository`] when persistence fails.
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskServiceResult<TaskUpdate> {
        let before = self.load(request.id).await?;
        let mut after = before.clone();
        let plaintext = match request.summary.filter(|summary| !summary.is_empty()) {
            Some(summary) => {
                after.replace_summary(self.seal(before.id(), &summary)?);
                summary
            }
            None => self.open(&before)?,
        };
        after.apply_completion(request.completion);
        if let Some(owner) = request.owner {
            after.reassign(owner);
        }
        self.repository.update(&after).await?;

        let newly_completed = is_newly_completed(&before, &after);
        if newly_completed {
            info!(task_id = %after.id(), "task completed; notifying managers");
            self.fanout.dispatch(after.clone());
        }
        Ok(TaskUpdate {
            task: TaskRecord::from_task(after, plaintext),
            newly_completed,
        })
    }

    /// Marks a task completed now.
    ///
    /// # Errors
    ///
    /// See [`TaskService::update`].
    pub async fn complete(&self, id: TaskId) -> TaskServiceResult<TaskUpdate> {
        self.update(UpdateTaskRequest::new(id).completed_at(self.clock.utc()))
            .await
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when nothing was deleted.
    pub async fn delete(&self, id: TaskId) -> TaskServiceResult<()> {
        if self.repository.delete(id).await? {
            info!(task_id = %id, "task deleted");
            Ok(())
        } else {
            Err(TaskServiceError::NotFound(id))
        }
    }

    async fn load(&self, id: TaskId) -> TaskServiceResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    fn decrypt(&self, task: Task) -> TaskServiceResult<TaskRecord> {
        let summary = self.open(&task)?;
        Ok(TaskRecord::from_task(task, summary))
    }

    fn open(&self, task: &Task) -> TaskServiceResult<String> {
        let summary = self.cipher.open(task.summary()).inspect_err(|err| {
            warn!(task_id = %task.id(), error = %err, "failed to open task summary");
        })?;
        Ok(summary)
    }

    fn seal(&self, id: TaskId, summary: &str) -> TaskServiceResult<EncryptedField> {
        let sealed = self.cipher.seal(summary).inspect_err(|err| {
            warn!(task_id = %id, error = %err, "failed to seal task summary");
        })?;
        Ok(sealed)
    }
}
