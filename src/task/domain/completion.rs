//! Completion-state detection.
//!
//! Notifications fire on the edge from "not completed" to "completed". The
//! comparison must use the record read from storage before the update was
//! applied: a request payload that omits the completion field says nothing
//! about the stored state.

use super::Task;
use chrono::{DateTime, Utc};

/// Requested change to a task's completion timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionUpdate {
    /// Leave the stored timestamp as it is.
    #[default]
    Unchanged,
    /// Mark the task completed at the given instant.
    Set(DateTime<Utc>),
    /// Clear the completion timestamp.
    Clear,
}

impl CompletionUpdate {
    /// Maps an optional timestamp from a full-replacement payload, where
    /// `None` means "explicitly not completed".
    #[must_use]
    pub const fn from_replacement(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(timestamp) => Self::Set(timestamp),
            None => Self::Clear,
        }
    }
}

/// Returns whether `after` represents a transition into the completed state.
///
/// True only when `before` had no completion timestamp and `after` has one.
/// A task that is cleared and later completed again yields a fresh `true`
/// on each such edge.
#[must_use]
pub const fn is_newly_completed(before: &Task, after: &Task) -> bool {
    !before.is_completed() && after.is_completed()
}
