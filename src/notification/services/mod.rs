//! Notification publishing, consumption, and lifecycle services.

mod audit;
mod consumer;
mod coordinator;
mod publisher;
mod runtime;

pub use audit::AuditLogHandler;
pub use consumer::{ConsumerError, DrainOutcome, NotificationConsumer};
pub use coordinator::{ConsumerCoordinator, DEFAULT_SHUTDOWN_TIMEOUT, ShutdownOutcome};
pub use publisher::QueuePublisher;
pub use runtime::NotificationRuntime;
