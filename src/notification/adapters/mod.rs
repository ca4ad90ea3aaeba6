//! Adapter implementations for notification ports.

pub mod amqp;
pub mod log;
pub mod memory;

pub use amqp::AmqpChannel;
pub use log::LogPublisher;
pub use memory::{InMemoryBroker, PublishedMessage, RecordingHandler};
