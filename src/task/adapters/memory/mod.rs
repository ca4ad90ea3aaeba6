//! In-memory adapters for task persistence and manager lookup.

mod directory;
mod task;

pub use directory::InMemoryManagerDirectory;
pub use task::InMemoryTaskRepository;
