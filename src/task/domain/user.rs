//! User identity and roles as seen by the task domain.

use super::{ParseRoleError, TaskDomainError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Supervises technicians and receives completion notifications.
    Manager,
    /// Performs tasks.
    Technician,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Technician => "technician",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "manager" => Ok(Self::Manager),
            "technician" => Ok(Self::Technician),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// User identity embedded in tasks and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UserFields")]
pub struct User {
    id: UserId,
    username: String,
}

impl User {
    /// Creates a user reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyUsername`] when the username is blank.
    pub fn new(id: UserId, username: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = username.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyUsername);
        }
        Ok(Self {
            id,
            username: trimmed.to_owned(),
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Deserialize)]
struct UserFields {
    id: UserId,
    username: String,
}

impl TryFrom<UserFields> for User {
    type Error = TaskDomainError;

    fn try_from(fields: UserFields) -> Result<Self, Self::Error> {
        Self::new(fields.id, fields.username)
    }
}
