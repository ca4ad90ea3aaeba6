//! In-memory manager directory.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Role, User},
    ports::{ManagerDirectory, ManagerDirectoryError, ManagerDirectoryResult},
};

/// Thread-safe in-memory user roster with roles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryManagerDirectory {
    users: Arc<RwLock<Vec<(User, Role)>>>,
}

impl InMemoryManagerDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user with the given role.
    ///
    /// # Errors
    ///
    /// Returns a lookup error when lock acquisition fails.
    pub fn add_user(&self, user: User, role: Role) -> ManagerDirectoryResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|err| ManagerDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        users.push((user, role));
        Ok(())
    }
}

#[async_trait]
impl ManagerDirectory for InMemoryManagerDirectory {
    async fn list_managers(&self) -> ManagerDirectoryResult<Vec<User>> {
        let users = self
            .users
            .read()
            .map_err(|err| ManagerDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(users
            .iter()
            .filter(|(_, role)| *role == Role::Manager)
            .map(|(user, _)| user.clone())
            .collect())
    }
}
