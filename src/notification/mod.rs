//! Completion notification channel.
//!
//! When a task moves into the completed state, one [`domain::Notification`]
//! per manager is published to a durable broker queue. A long-running
//! consumer drains that queue, records each notification, and acknowledges
//! it after processing (at-least-once delivery). The module follows the
//! same hexagonal split as [`crate::task`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Publisher, consumer, and lifecycle services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
