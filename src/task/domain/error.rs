//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The identifier is not a positive integer.
    #[error("invalid identifier {0}, expected a positive integer")]
    InvalidId(i64),

    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,
}

/// Error returned while parsing user roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);
