//! Port for resolving the users who receive completion notifications.

use crate::task::domain::User;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for manager directory lookups.
pub type ManagerDirectoryResult<T> = Result<T, ManagerDirectoryError>;

/// Lists the users currently holding the manager role.
///
/// Implementations must resolve the set at call time; fan-out never caches
/// recipients between transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManagerDirectory: Send + Sync {
    /// Returns every user with the manager role.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerDirectoryError`] when the user store cannot be read.
    async fn list_managers(&self) -> ManagerDirectoryResult<Vec<User>>;
}

/// Errors returned by manager directory implementations.
#[derive(Debug, Clone, Error)]
#[error("failed to list managers: {0}")]
pub struct ManagerDirectoryError(pub Arc<dyn std::error::Error + Send + Sync>);

impl ManagerDirectoryError {
    /// Wraps a lookup failure.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
