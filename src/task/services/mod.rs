//! Application services for task management and completion fan-out.

mod fanout;
mod service;

pub use fanout::{CompletionFanout, FanoutError, FanoutReport};
pub use service::{
    CreateTaskRequest, TaskService, TaskServiceError, TaskServiceResult, TaskUpdate,
    UpdateTaskRequest,
};
