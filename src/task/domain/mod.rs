//! Domain model for task records and completion tracking.
//!
//! Tasks carry their summary only in sealed form; the decrypted
//! [`TaskRecord`] view exists transiently while serving a request. The
//! completion detector in [`completion`] decides whether an update moved a
//! task into the completed state.

pub mod completion;
mod error;
mod ids;
mod task;
mod user;

pub use completion::{CompletionUpdate, is_newly_completed};
pub use error::{ParseRoleError, TaskDomainError};
pub use ids::{TaskId, UserId};
pub use task::{NewTask, PersistedTaskData, Task, TaskRecord};
pub use user::{Role, User};
