//! Foreman: task tracking with encrypted summaries and completion
//! notifications.
//!
//! Task summaries are sealed with AES-GCM before they reach storage. When an
//! update moves a task into the completed state, every manager receives a
//! notification through a durable broker queue, published off the request
//! path. A consumer on the same queue records each notification and stops
//! within a fixed bound at shutdown.
//!
//! # Architecture
//!
//! Foreman follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (broker, in-memory)
//!
//! # Modules
//!
//! - [`crypto`]: Field sealing and opening
//! - [`task`]: Task storage orchestration and completion fan-out
//! - [`notification`]: Notification publishing and consumption
//! - [`config`]: Environment configuration
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod crypto;
pub mod notification;
pub mod task;
pub mod telemetry;
