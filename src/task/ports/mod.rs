//! Port contracts for task persistence and manager lookup.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod directory;
pub mod repository;

pub use directory::{ManagerDirectory, ManagerDirectoryError, ManagerDirectoryResult};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
